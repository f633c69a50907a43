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

//! Per-user install layout under a prefix such as `~/.local`.

use crate::error::Result;
use crate::paths::shared::ensure_child_directory;
use std::path::{Path, PathBuf};

pub const LIB64_DIR: &str = "lib64";
pub const LIB_DIR: &str = "lib";
pub const SHARE_DIR: &str = "share";
pub const OPT_DIR: &str = "opt";
pub const APPLICATIONS_DIR: &str = "applications";
pub const PIXMAPS_DIR: &str = "pixmaps";
pub const ICONS_DIR: &str = "icons";
pub const BIN_DIR: &str = "bin";
pub const TEMP_STAGING_DIR: &str = ".tmp";
pub const REGISTRY_FILE: &str = "local_machine.json";

/// Directory that receives installed programs: `lib64`, or `lib` on
/// 32-bit targets.
pub fn programs_dir(prefix: &Path) -> PathBuf {
    if cfg!(target_pointer_width = "32") {
        prefix.join(LIB_DIR)
    } else {
        prefix.join(LIB64_DIR)
    }
}

pub fn share_dir(prefix: &Path) -> PathBuf {
    prefix.join(SHARE_DIR)
}

pub fn applications_dir(prefix: &Path) -> PathBuf {
    share_dir(prefix).join(APPLICATIONS_DIR)
}

pub fn pixmaps_dir(prefix: &Path) -> PathBuf {
    share_dir(prefix).join(PIXMAPS_DIR)
}

pub fn temp_staging_directory(programs_dir: &Path) -> PathBuf {
    programs_dir.join(TEMP_STAGING_DIR)
}

pub fn registry_file(home: &Path) -> PathBuf {
    home.join(REGISTRY_FILE)
}

pub fn ensure_temp_staging_directory(programs_dir: &Path) -> Result<PathBuf> {
    ensure_child_directory(programs_dir, TEMP_STAGING_DIR)
}
