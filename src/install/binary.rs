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
use crate::naming::title_case;
use crate::paths::layout::BIN_DIR;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions a launcher script may have (empty means none).
pub const SCRIPT_EXTENSIONS: &[&str] = &["", "sh", "32", "64"];

/// Launchers preferred when several scripts remain.
const KNOWN_BINARIES: &[&str] = &["RunAwesomeBump.sh"];

/// Scripts picked even when they do not start with the program name.
const KNOWN_MAIN_SCRIPTS: &[&str] = &["monero-wallet-gui"];

/// Binaries inside a deb's program directory that do not follow its name.
const KNOWN_DEB_BINARIES: &[&str] = &["signal-desktop-beta"];

/// Find the launcher of a program directory.
pub fn detect_binary(program_dir: &Path, hyphenated_names: &[String]) -> Result<PathBuf> {
    let dir_name = program_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    for name in candidate_names(&dir_name, hyphenated_names) {
        for candidate in [program_dir.join(BIN_DIR).join(&name), program_dir.join(&name)] {
            if candidate.is_file() {
                debug!("Detected binary {}", candidate.display());
                return Ok(candidate);
            }
        }
    }

    let mut scripts = Vec::new();
    let mut jars = Vec::new();
    for name in sorted_file_names(program_dir)? {
        if name.ends_with(".jar") {
            jars.push(name);
        } else if SCRIPT_EXTENSIONS.contains(&extension_of(&name)) {
            scripts.push(name);
        }
    }
    debug!("Scripts in {}: {scripts:?} (jars: {jars:?})", program_dir.display());

    let only_name = dir_name.trim_matches(|c: char| "-0123456789. ".contains(c));
    let mut force = false;
    if scripts.len() >= 2 {
        let matching: Vec<&String> = scripts
            .iter()
            .filter(|s| s.starts_with(only_name) || KNOWN_MAIN_SCRIPTS.contains(&s.as_str()))
            .collect();
        if let [only] = matching.as_slice() {
            debug!("Only {only} matches {only_name:?}");
            scripts = vec![(*only).clone()];
            force = true;
        }
    }

    let redundant = match scripts.as_slice() {
        [first, second] => {
            let (short, long) = if first.len() > second.len() {
                (second, first)
            } else {
                (first, second)
            };
            long.starts_with(file_stem_of(short)).then(|| long.clone())
        }
        _ => None,
    };
    if let Some(long) = redundant {
        scripts.retain(|s| *s != long);
    }

    if scripts.len() > 1
        && let Some(known) = KNOWN_BINARIES.iter().find(|k| scripts.iter().any(|s| s == *k))
    {
        scripts = vec![known.to_string()];
    }

    if !jars.is_empty() {
        force = true;
    }

    match scripts.first() {
        Some(script) if force || scripts.len() == 1 => {
            let binary = program_dir.join(script);
            debug!("Detected executable script {}", binary.display());
            Ok(binary)
        }
        _ => Err(NopackageError::BinaryNotFound {
            dir: program_dir.display().to_string(),
            candidates: scripts.into_iter().chain(jars).collect(),
        }),
    }
}

/// Find the binary in a program directory unpacked from a deb: a file
/// named like the directory, otherwise the only file.
pub fn detect_deb_binary(program_dir: &Path) -> Result<PathBuf> {
    let program = program_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let names = [
        program.clone(),
        program.to_lowercase(),
        title_case(&program),
        program.to_uppercase(),
    ];

    let files = sorted_file_names(program_dir)?;
    if let Some(found) = files
        .iter()
        .find(|f| names.contains(f) || KNOWN_DEB_BINARIES.contains(&f.as_str()))
    {
        return Ok(program_dir.join(found));
    }

    match files.as_slice() {
        [only] => Ok(program_dir.join(only)),
        _ => Err(NopackageError::BinaryNotFound {
            dir: program_dir.display().to_string(),
            candidates: files,
        }),
    }
}

fn candidate_names(dir_name: &str, hyphenated_names: &[String]) -> Vec<String> {
    let name_partial = if hyphenated_names.iter().any(|h| h == dir_name) {
        dir_name
    } else {
        dir_name.split('-').next().unwrap_or(dir_name)
    };

    let mut names = vec![
        format!("{name_partial}.sh"),
        format!("{name_partial}.py"),
        name_partial.to_string(),
    ];
    if let Some(second) = dir_name.split('-').nth(1) {
        names.push(format!("{second}.sh"));
    }
    names
}

/// Non-hidden regular files directly inside `dir`, by name.
fn sorted_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.path().is_file() {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

fn extension_of(name: &str) -> &str {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

fn file_stem_of(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
}
