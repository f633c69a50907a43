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
use crate::platform::file_ops;
use crate::registry::LocalMachine;
use std::fs;
use std::path::Path;

/// Load the registry file. A missing file is an empty registry.
pub fn load_local_machine(path: &Path) -> Result<LocalMachine> {
    if !path.exists() {
        log::debug!("No registry at {}, starting empty", path.display());
        return Ok(LocalMachine::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        NopackageError::Registry(format!("Failed to read {}: {e}", path.display()))
    })?;

    serde_json::from_str(&contents)
        .map_err(|e| NopackageError::Registry(format!("{} is malformed: {e}", path.display())))
}

/// Save the registry through a temporary file and rename.
pub fn save_local_machine(local_machine: &LocalMachine, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            NopackageError::Registry(format!("Failed to create registry directory: {e}"))
        })?;
    }

    let json = serde_json::to_string_pretty(local_machine)?;

    let temp_path = path.with_extension("tmp");

    // Clean up any leftover temp file from previous failed attempts
    if temp_path.exists() {
        fs::remove_file(&temp_path).map_err(|e| {
            NopackageError::Registry(format!("Failed to remove old temp file: {e}"))
        })?;
    }

    fs::write(&temp_path, json)
        .map_err(|e| NopackageError::Registry(format!("Failed to write registry: {e}")))?;

    file_ops::atomic_rename(&temp_path, path)
        .map_err(|e| NopackageError::Registry(format!("Failed to rename registry file: {e}")))?;

    Ok(())
}
