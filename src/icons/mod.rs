// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Icon lookup for shortcuts.
//!
//! Icons are never downloaded. A link is only used to derive the file name
//! a previously fetched icon would have in the pixmaps directory.

use crate::config::NopackageConfig;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Icon theme names by luid.
pub const ICON_THEME_NAMES: &[(&str, &str)] = &[
    ("freecad", "org.freecadweb.FreeCAD"),
    ("ultimaker.cura", "cura"),
];

/// Upstream icon locations by luid.
pub const ICON_LINKS: &[(&str, &str)] = &[
    (
        "ultimaker.cura",
        "https://github.com/Ultimaker/Cura/raw/master/icons/cura-48.png",
    ),
    (
        "prusaslicer",
        "https://github.com/prusa3d/PrusaSlicer/raw/master/resources/icons/PrusaSlicer.png",
    ),
    (
        "pycharm.community",
        "https://github.com/JetBrains/intellij-community/raw/master/python/resources/PyCharmCore128.png",
    ),
    (
        "keepassxc",
        "https://github.com/keepassxreboot/keepassxc/raw/develop/share/icons/application/scalable/apps/keepassxc.svg",
    ),
    ("unityhub", "https://img.icons8.com/ios-filled/50/000000/unity.png"),
    (
        "godot",
        "https://github.com/godotengine/godot/raw/master/main/app_icon.png",
    ),
    (
        "ninja-ide",
        "https://github.com/ninja-ide/ninja-ide/raw/develop/icon.png",
    ),
    (
        "olive",
        "https://upload.wikimedia.org/wikipedia/commons/c/c7/Olive_Video_Editor_Logo.png",
    ),
    (
        "pronterface",
        "https://raw.githubusercontent.com/kliment/Printrun/master/pronterface.png",
    ),
    (
        "pronsole",
        "https://raw.githubusercontent.com/kliment/Printrun/master/pronsole.png",
    ),
    (
        "plater",
        "https://raw.githubusercontent.com/kliment/Printrun/master/plater.png",
    ),
    (
        "balenaetcher",
        "https://github.com/balena-io/etcher/blob/master/assets/icon.png",
    ),
    (
        "pcsx2",
        "https://github.com/PCSX2/pcsx2/raw/master/bin/resources/icons/AppIconLarge.png",
    ),
];

/// Local file stems for links whose file name does not identify the program.
pub const ICON_FILE_STEMS: &[(&str, &str)] = &[
    ("godot", "godot"),
    ("ninja-ide", "ninja-ide"),
    ("balenaetcher", "balenaetcher"),
    ("pcsx2", "pcsx2"),
];

/// Last path segment of a URL without its query or fragment.
pub fn filename_from_url(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    path.rsplit('/').next().unwrap_or(path)
}

/// Value for a desktop entry's `Icon=` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    File(PathBuf),
    Theme(String),
}

impl Icon {
    pub fn desktop_value(&self) -> String {
        match self {
            Icon::File(path) => path.display().to_string(),
            Icon::Theme(name) => name.clone(),
        }
    }
}

pub struct IconResolver {
    pixmaps_dir: PathBuf,
    theme_names: BTreeMap<String, String>,
    links: BTreeMap<String, String>,
    file_stems: BTreeMap<String, String>,
}

fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl IconResolver {
    /// Resolver over the built-in tables only.
    pub fn new(pixmaps_dir: PathBuf) -> Self {
        Self {
            pixmaps_dir,
            theme_names: table(ICON_THEME_NAMES),
            links: table(ICON_LINKS),
            file_stems: table(ICON_FILE_STEMS),
        }
    }

    /// Built-in tables with the `[icons]` config section merged over them.
    pub fn from_config(config: &NopackageConfig, pixmaps_dir: PathBuf) -> Self {
        let mut resolver = Self::new(pixmaps_dir);
        resolver.theme_names.extend(
            config
                .icons
                .names
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        resolver.links.extend(
            config
                .icons
                .links
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        resolver
    }

    /// File name an icon fetched from the link table would be stored as.
    pub fn linked_file_name(&self, luid: &str) -> Option<String> {
        let url = self.links.get(luid)?;
        let file_name = filename_from_url(url);
        match self.file_stems.get(luid) {
            Some(stem) => {
                let extension = Path::new(file_name)
                    .extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()))
                    .unwrap_or_default();
                Some(format!("{stem}{extension}"))
            }
            None => Some(file_name.to_string()),
        }
    }

    pub fn resolve(&self, luid: &str) -> Icon {
        let bundled = self.pixmaps_dir.join(format!("{luid}.png"));
        if is_usable(&bundled) {
            debug!("Using icon {}", bundled.display());
            return Icon::File(bundled);
        }

        if let Some(file_name) = self.linked_file_name(luid) {
            let linked = self.pixmaps_dir.join(&file_name);
            if is_usable(&linked) {
                debug!("Using previously fetched icon {}", linked.display());
                return Icon::File(linked);
            }
            debug!("Icon {file_name} for {luid} is not in {}", self.pixmaps_dir.display());
        }

        if let Some(name) = self.theme_names.get(luid) {
            debug!("Using known icon name {name} for {luid}");
            return Icon::Theme(name.clone());
        }

        Icon::Theme(luid.to_string())
    }
}

// A zero-byte file is a failed fetch, not an icon.
fn is_usable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.len() > 0)
        .unwrap_or(false)
}
