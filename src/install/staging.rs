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

use crate::error::Result;
use crate::paths::layout;
use crate::paths::shared::sanitize_segment;
use std::fs;
use std::path::{Path, PathBuf};

/// Scratch directory under `<programs>/.tmp`, removed when dropped.
#[derive(Debug)]
pub struct StagingArea {
    path: PathBuf,
}

impl StagingArea {
    pub fn create(programs_dir: &Path, label: &str) -> Result<Self> {
        let temp_parent = layout::ensure_temp_staging_directory(programs_dir)?;
        let label = sanitize_segment(label).unwrap_or_else(|| "install".to_string());
        let path = temp_parent.join(format!("{label}-{}", uuid::Uuid::new_v4()));
        fs::create_dir(&path)?;
        log::debug!("Created staging directory {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure the single top-level entry of `staged` has the name
    /// `dir_name`, wrapping loose entries in a new directory when needed.
    pub fn program_dir(&self, staged: &Path, dir_name: &str) -> Result<PathBuf> {
        if let Some(root) = crate::archive::detect_program_root(staged)? {
            log::debug!("Detected program path {}", root.display());
            return Ok(root);
        }

        let wrapper = self.path.join(format!(".wrap-{}", uuid::Uuid::new_v4()));
        let program_dir = wrapper.join(dir_name);
        fs::create_dir_all(&wrapper)?;
        fs::rename(staged, &program_dir)?;
        log::debug!("Wrapped loose entries in {}", program_dir.display());
        Ok(program_dir)
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if self.path.exists()
            && let Err(e) = fs::remove_dir_all(&self.path)
        {
            log::warn!(
                "Failed to remove staging directory {}: {e}",
                self.path.display()
            );
        }
    }
}
