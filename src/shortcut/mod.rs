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

//! XDG desktop entries: naming, rendering and merging.

pub mod installer;

pub use installer::ShortcutInstaller;

use crate::error::Result;
use crate::paths::layout::{APPLICATIONS_DIR, BIN_DIR, ICONS_DIR, SHARE_DIR};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub const DESKTOP_EXTENSION: &str = ".desktop";
pub const DESKTOP_SECTION: &str = "[Desktop Entry]";

/// Extra desktop entry keys for programs that are known to need them.
const SHORTCUT_METADATA: &[(&str, &[(&str, &str)])] = &[
    (
        "argouml",
        &[("Keywords", "Development;IDE;"), ("Categories", "Development;IDE;")],
    ),
    (
        "godot",
        &[("Keywords", "Development;IDE;"), ("Categories", "Development;IDE;")],
    ),
    ("mirage", &[("Categories", "Network;InstantMessaging;")]),
    (
        "ninja-ide",
        &[
            ("Keywords", "Qt;Development;IDE;TextEditor;"),
            ("Categories", "Text;Editor;"),
        ],
    ),
    ("olive", &[("Categories", "AudioVideo;Video;AudioVideoEditing;")]),
    (
        "pycharm",
        &[("Keywords", "Development;IDE;"), ("Categories", "Development;IDE;")],
    ),
    (
        "staruml",
        &[("Keywords", "Development;IDE;"), ("Categories", "Development;IDE;")],
    ),
    (
        "unityhub",
        &[("Keywords", "Development;IDE;"), ("Categories", "Development;IDE;")],
    ),
    (
        "pronterface",
        &[
            ("GenericName", "Printer Interface"),
            ("Comment", "Controls your 3D printer"),
            ("StartupNotify", "true"),
            ("Categories", "GNOME;GTK;Utility;Graphics;3DGraphics;"),
            (
                "MimeType",
                "application/sla;model/x.stl-binary;model/x.stl-ascii;text/x.gcode;",
            ),
        ],
    ),
    (
        "pronsole",
        &[
            ("GenericName", "Printer console"),
            ("Comment", "Controls your 3D printer form console"),
            ("StartupNotify", "true"),
            ("Terminal", "true"),
            ("Categories", "Utility;Graphics;3DGraphics;ConsoleOnly;"),
        ],
    ),
    (
        "plater",
        &[
            ("GenericName", "Printer building tool"),
            ("Comment", "Prepares plates for 3D printing"),
            ("StartupNotify", "true"),
            ("Categories", "Utility;Graphics;3DGraphics;ConsoleOnly;"),
        ],
    ),
];

/// Known extra keys for a luid, in declaration order.
pub fn shortcut_metadata(luid: &str) -> &'static [(&'static str, &'static str)] {
    SHORTCUT_METADATA
        .iter()
        .find(|(known, _)| *known == luid)
        .map(|(_, fields)| *fields)
        .unwrap_or(&[])
}

/// File name of the shortcut for a program.
///
/// `suffix` is the packaging suffix (`-AppImage`, `-deb` or empty).
pub fn shortcut_name(luid: &str, suffix: &str, version: Option<&str>, multi_version: bool) -> String {
    let stem = match (luid, version) {
        ("blender", Some(version)) => format!("blender{suffix}-{version}"),
        ("blender", None) => format!("blender{suffix}"),
        ("godot", Some(version)) => format!("godot-{}", version.replace(' ', "-")),
        ("godot", None) => format!("godot{suffix}"),
        (_, Some(version)) if multi_version => format!("{luid}{suffix}-{version}"),
        (_, Some(_)) => format!("{luid}{suffix}"),
        (_, None) => luid.to_string(),
    };
    format!("{stem}{DESKTOP_EXTENSION}")
}

/// Names earlier releases used for the same shortcut.
pub fn legacy_shortcut_name(luid: &str, version: Option<&str>) -> Option<String> {
    let stem = match (luid, version) {
        ("blender", Some(version)) => format!("org.blender-{version}"),
        ("blender", None) => "org.blender".to_string(),
        ("godot", _) => "godot".to_string(),
        _ => return None,
    };
    Some(format!("{stem}{DESKTOP_EXTENSION}"))
}

/// Caption shown in menus. Godot drops `stable` so that the stable and
/// mono builds stay distinguishable when the name is truncated.
pub fn shortcut_caption(caption: &str) -> String {
    if caption.contains("Godot") {
        caption.replace(" stable", "")
    } else {
        caption.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    pub name: String,
    pub exec: String,
    pub icon: String,
    pub extra: Vec<(String, String)>,
}

impl DesktopEntry {
    pub fn new(name: impl Into<String>, exec: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exec: exec.into(),
            icon: icon.into(),
            extra: Vec::new(),
        }
    }

    /// Append the known extra keys for `luid`.
    pub fn with_metadata_for(mut self, luid: &str) -> Self {
        for (key, value) in shortcut_metadata(luid) {
            debug!("Using known {luid} {key}={value}");
            self.extra.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn render(&self) -> String {
        let mut data = format!(
            "{DESKTOP_SECTION}\nName={}\nExec={}\nIcon={}\nTerminal=false\nType=Application\n",
            self.name, self.exec, self.icon
        );
        for (key, value) in &self.extra {
            data.push_str(&format!("{key}={value}\n"));
        }
        data
    }
}

/// Rewrite `key=value` lines inside sections with values from `meta`.
///
/// Comments, blank lines and lines outside any section are kept. With
/// `add_all`, keys from `meta` that were not present are appended.
pub fn format_shortcut(data: &str, meta: &[(&str, &str)], add_all: bool) -> String {
    let data = if data.contains("\r\n") {
        warn!("Converting \\r\\n newlines in shortcut data");
        data.replace("\r\n", "\n")
    } else {
        data.to_string()
    };

    let mut used = vec![false; meta.len()];
    let mut result = String::with_capacity(data.len());
    let mut section: Option<&str> = None;

    let lines: Vec<&str> = data.split('\n').collect();
    // A trailing newline yields one empty element, which is not a line.
    let count = if data.ends_with('\n') {
        lines.len() - 1
    } else {
        lines.len()
    };

    for (index, raw) in lines.iter().take(count).enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            result.push_str(line);
        } else if line.starts_with('[') && line.ends_with(']') {
            section = Some(&line[1..line.len() - 1]);
            result.push_str(line);
        } else if section.is_some() {
            match line.find('=') {
                Some(sign) if sign > 0 => {
                    let key = line[..sign].trim();
                    let mut value = line[sign + 1..].trim();
                    if let Some(position) = meta.iter().position(|(name, _)| *name == key) {
                        value = meta[position].1;
                        used[position] = true;
                    }
                    result.push_str(&format!("{key}={value}"));
                }
                _ => {
                    warn!("Shortcut line {} has no assignment: {line}", index + 1);
                    result.push_str(line);
                }
            }
        } else {
            warn!("Shortcut line {} is outside any section: {line}", index + 1);
            result.push_str(line);
        }
        result.push('\n');
    }

    if add_all {
        for ((name, value), used) in meta.iter().zip(used) {
            if !used {
                result.push_str(&format!("{name}={value}\n"));
            }
        }
    }

    result
}

/// Shortcut and icon shipped next to a `bin/` directory, as a virtualenv
/// with `share/applications` and `share/icons` would have.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundledShortcut {
    pub desktop_file: Option<PathBuf>,
    pub icon: Option<PathBuf>,
}

impl BundledShortcut {
    pub fn find(binary: &Path) -> Option<Self> {
        let bin_dir = binary.parent()?;
        if bin_dir.file_name()? != BIN_DIR {
            debug!("No bundled shortcut: {} is not named bin", bin_dir.display());
            return None;
        }
        let share = bin_dir.parent()?.join(SHARE_DIR);
        let bundled = Self {
            desktop_file: only_entry(&share.join(APPLICATIONS_DIR)),
            icon: only_entry(&share.join(ICONS_DIR)),
        };
        (bundled.desktop_file.is_some() || bundled.icon.is_some()).then_some(bundled)
    }

    /// Merge the bundled desktop file with the installed paths.
    pub fn render(&self, caption: &str, exec: &str, icon: &str) -> Result<Option<String>> {
        let Some(desktop_file) = &self.desktop_file else {
            return Ok(None);
        };
        let data = fs::read_to_string(desktop_file)?;
        let meta = [("Exec", exec), ("TryExec", exec), ("Name", caption), ("Icon", icon)];
        Ok(Some(format_shortcut(&data, &meta, true)))
    }
}

fn only_entry(dir: &Path) -> Option<PathBuf> {
    let entries: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();
    match entries.as_slice() {
        [only] => Some(only.clone()),
        [] => None,
        many => {
            debug!("{} holds {} entries, so none is used", dir.display(), many.len());
            None
        }
    }
}
