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

//! Record of installed programs, persisted as `local_machine.json`.
//!
//! Programs are keyed by luid. Multi-version installs also get a package
//! entry keyed by shortcut name, since one luid then owns several
//! shortcuts.

mod luid;
mod storage;

pub use luid::LuidState;
pub use storage::{load_local_machine, save_local_machine};

use crate::error::Result;
use crate::models::{Arch, Platform};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveWhat {
    File,
    Directory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalMachine {
    #[serde(default)]
    pub programs: BTreeMap<String, ProgramRecord>,
    #[serde(default)]
    pub packages: BTreeMap<String, PackageRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub luid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_dirpath: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sc_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dir: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_what: Option<MoveWhat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uninstall_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icon_paths: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<Arch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

impl ProgramRecord {
    pub fn new(luid: impl Into<String>) -> Self {
        Self {
            luid: luid.into(),
            ..Default::default()
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sc_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_dirpath: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub install_dates: Vec<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uninstall_dates: Vec<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_what: Option<MoveWhat>,
}

/// The registry file plus the id of the program being worked on.
pub struct Registry {
    path: PathBuf,
    data: LocalMachine,
    luid: LuidState,
}

impl Registry {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            data: load_local_machine(path)?,
            luid: LuidState::default(),
        })
    }

    pub fn save(&self) -> Result<()> {
        save_local_machine(&self.data, &self.path)?;
        log::debug!("Saved registry {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn luid_mut(&mut self) -> &mut LuidState {
        &mut self.luid
    }

    /// Record of the finalized program, if one exists.
    pub fn program(&self) -> Result<Option<&ProgramRecord>> {
        let luid = self.luid.finalized()?;
        Ok(self.data.programs.get(luid))
    }

    /// Record of the finalized program, created when missing.
    pub fn program_mut(&mut self) -> Result<&mut ProgramRecord> {
        let luid = self.luid.finalized()?.to_string();
        Ok(self
            .data
            .programs
            .entry(luid.clone())
            .or_insert_with(|| ProgramRecord::new(luid)))
    }

    pub fn package_mut(&mut self, sc_name: &str) -> &mut PackageRecord {
        self.data.packages.entry(sc_name.to_string()).or_default()
    }

    pub fn package(&self, sc_name: &str) -> Option<&PackageRecord> {
        self.data.packages.get(sc_name)
    }

    pub fn programs(&self) -> impl Iterator<Item = &ProgramRecord> {
        self.data.programs.values()
    }

    pub fn find(&self, luid: &str) -> Option<&ProgramRecord> {
        self.data.programs.get(luid)
    }

    pub fn local_machine(&self) -> &LocalMachine {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NopackageError;
    use tempfile::TempDir;

    #[test]
    fn test_program_access_requires_finalized_luid() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::load(&temp_dir.path().join("local_machine.json")).unwrap();

        assert!(matches!(
            registry.program_mut(),
            Err(NopackageError::LuidNotFinalized(_))
        ));

        registry.luid_mut().compute("mirage").unwrap();
        assert!(matches!(
            registry.program(),
            Err(NopackageError::LuidNotFinalized(_))
        ));

        registry.luid_mut().finalize().unwrap();
        assert!(registry.program().unwrap().is_none());
        registry.program_mut().unwrap().installed = Some(true);
        assert!(registry.program().unwrap().unwrap().is_installed());
    }

    #[test]
    fn test_listing_is_not_gated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("local_machine.json");
        let mut registry = Registry::load(&path).unwrap();
        registry.luid_mut().compute("blender").unwrap();
        registry.luid_mut().finalize().unwrap();
        registry.program_mut().unwrap().version = Some("2.79b".to_string());
        registry.package_mut("blender-2.79b").luid = Some("blender".to_string());
        registry.save().unwrap();

        let reloaded = Registry::load(&path).unwrap();
        assert_eq!(reloaded.programs().count(), 1);
        assert_eq!(
            reloaded.find("blender").unwrap().version.as_deref(),
            Some("2.79b")
        );
        assert_eq!(
            reloaded.package("blender-2.79b").unwrap().luid.as_deref(),
            Some("blender")
        );
    }

    #[test]
    fn test_record_json_layout() {
        let mut local_machine = LocalMachine::default();
        let mut record = ProgramRecord::new("mirage");
        record.move_what = Some(MoveWhat::File);
        record.arch = Some(Arch::Bit64);
        record.install_date = Some(
            DateTime::parse_from_rfc3339("2021-05-11T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        local_machine.programs.insert("mirage".to_string(), record);

        let json = serde_json::to_value(&local_machine).unwrap();
        assert_eq!(json["programs"]["mirage"]["move_what"], "file");
        assert_eq!(json["programs"]["mirage"]["arch"], "64bit");
        assert_eq!(
            json["programs"]["mirage"]["install_date"],
            "2021-05-11T10:00:00Z"
        );
        assert!(json["programs"]["mirage"].get("caption").is_none());
        assert!(json["packages"].as_object().unwrap().is_empty());
    }
}
