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


use crate::config::NopackageConfig;
use crate::error::Result;
use crate::install::{InstallRequest, Installer};
use colored::Colorize;
use std::path::Path;

pub struct RemoveCommand<'a> {
    config: &'a NopackageConfig,
}

impl<'a> RemoveCommand<'a> {
    pub fn new(config: &'a NopackageConfig) -> Result<Self> {
        Ok(Self { config })
    }

    /// Remove a program given its source path or its id.
    pub fn execute(&self, source: &Path, multi_version: bool) -> Result<()> {
        let request = InstallRequest {
            multi_version,
            ..InstallRequest::new(source)
        };
        let report = Installer::new(self.config).uninstall(&request)?;

        if report.removed.is_empty() {
            println!("Nothing was left to remove for {}", report.luid);
        } else {
            for path in &report.removed {
                println!("  - {}", path.display());
            }
        }
        println!("{} {}", "Removed".green().bold(), report.luid);
        Ok(())
    }
}
