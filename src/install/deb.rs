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

use crate::error::{NopackageError, Result};
use crate::paths::layout::{APPLICATIONS_DIR, ICONS_DIR, OPT_DIR, PIXMAPS_DIR, SHARE_DIR};
use crate::platform::file_ops;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories under `usr/share` that never hold the program itself.
const NON_PROGRAM_DIRS: &[&str] = &[APPLICATIONS_DIR, ICONS_DIR, "doc", PIXMAPS_DIR];

/// The program found inside an unpacked deb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebProgram {
    /// `usr/share/<program>` or `opt/<program>` in the unpacked tree.
    pub program_dir: PathBuf,
    /// `share` or `opt`: where the program goes under the prefix.
    pub programs_dir_name: &'static str,
}

impl DebProgram {
    /// Locate the single program directory of an unpacked deb.
    pub fn locate(unpacked: &Path) -> Result<Self> {
        let mut found = Vec::new();
        for (relative, programs_dir_name) in
            [(Path::new("usr").join(SHARE_DIR), SHARE_DIR), (PathBuf::from(OPT_DIR), OPT_DIR)]
        {
            let parent = unpacked.join(relative);
            if !parent.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&parent)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with('.')
                    || NON_PROGRAM_DIRS.contains(&name.as_str())
                    || !entry.path().is_dir()
                {
                    continue;
                }
                found.push(Self {
                    program_dir: entry.path(),
                    programs_dir_name,
                });
            }
        }

        match found.len() {
            1 => {
                let program = found.remove(0);
                info!("Found program directory {}", program.program_dir.display());
                Ok(program)
            }
            count => Err(NopackageError::UnsupportedSource(format!(
                "Expected exactly one program directory in usr/share or opt, found {count}: {:?}",
                found
                    .iter()
                    .map(|p| p.program_dir.display().to_string())
                    .collect::<Vec<_>>()
            ))),
        }
    }

    pub fn name(&self) -> String {
        self.program_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Move every file under `usr/share/icons` into `pixmaps_dir`, flattened,
/// and return the new paths in walk order.
pub fn move_icons(unpacked: &Path, pixmaps_dir: &Path) -> Result<Vec<PathBuf>> {
    let icons = unpacked.join("usr").join(SHARE_DIR).join(ICONS_DIR);
    if !icons.is_dir() {
        debug!("No {} directory in the package", icons.display());
        return Ok(Vec::new());
    }

    let mut moved: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(&icons).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        fs::create_dir_all(pixmaps_dir)?;
        let target = pixmaps_dir.join(entry.file_name());
        if target.exists() {
            fs::remove_file(&target)?;
        }
        file_ops::move_path(entry.path(), &target)?;
        debug!("Added icon {}", target.display());
        moved.retain(|p| *p != target);
        moved.push(target);
    }

    if moved.is_empty() {
        info!("No icons were found in {}", icons.display());
    }
    Ok(moved)
}
