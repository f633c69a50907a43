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
use crate::registry::{ProgramRecord, Registry};
use comfy_table::{Table, presets::UTF8_FULL};
use log::debug;

pub struct ListCommand<'a> {
    config: &'a NopackageConfig,
}

impl<'a> ListCommand<'a> {
    pub fn new(config: &'a NopackageConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, json: bool) -> Result<()> {
        let registry = Registry::load(&self.config.registry_path())?;
        debug!("Listing {}", registry.path().display());

        if json {
            println!("{}", serde_json::to_string_pretty(registry.local_machine())?);
            return Ok(());
        }

        let programs: Vec<&ProgramRecord> = registry.programs().collect();
        if programs.is_empty() {
            println!("No programs installed");
            println!("Use 'nopackage install <file>' to install one");
            return Ok(());
        }

        println!("{}", render_table(&programs));
        let installed = programs.iter().filter(|p| p.is_installed()).count();
        println!();
        println!(
            "{installed} installed, {} removed",
            programs.len() - installed
        );
        Ok(())
    }
}

fn render_table(programs: &[&ProgramRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Id", "Caption", "Version", "Installed", "Destination"]);

    for program in programs {
        let destination = program
            .dst_dirpath
            .as_ref()
            .or(program.dst_path.as_ref())
            .or(program.src_path.as_ref())
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        table.add_row(vec![
            program.luid.clone(),
            program.caption.clone().unwrap_or_default(),
            program.version.clone().unwrap_or_default(),
            if program.is_installed() { "yes" } else { "no" }.to_string(),
            destination,
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_list_empty_registry() {
        let temp_dir = TempDir::new().unwrap();
        let config = NopackageConfig::new(temp_dir.path().to_path_buf()).unwrap();
        let command = ListCommand::new(&config).unwrap();
        assert!(command.execute(false).is_ok());
        assert!(command.execute(true).is_ok());
    }

    #[test]
    fn test_table_shows_destination() {
        let mut record = ProgramRecord::new("mirage");
        record.caption = Some("Mirage 0.6.4 (AppImage)".to_string());
        record.version = Some("0.6.4".to_string());
        record.installed = Some(true);
        record.dst_path = Some(PathBuf::from("/prefix/lib64/Mirage-0.6.4-x86_64.AppImage"));

        let rendered = render_table(&[&record]).to_string();
        assert!(rendered.contains("mirage"));
        assert!(rendered.contains("Mirage 0.6.4 (AppImage)"));
        assert!(rendered.contains("yes"));
        assert!(rendered.contains("Mirage-0.6.4-x86_64.AppImage"));
    }
}
