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
use crate::install::{InstallReport, InstallRequest, Installer};
use colored::Colorize;
use log::debug;

pub struct InstallCommand<'a> {
    config: &'a NopackageConfig,
}

impl<'a> InstallCommand<'a> {
    pub fn new(config: &'a NopackageConfig) -> Result<Self> {
        Ok(Self { config })
    }

    /// Install, or replace an existing install when `request.reinstall`.
    pub fn execute(&self, request: &InstallRequest) -> Result<()> {
        debug!("Install request: {request:?}");
        let verb = if request.reinstall {
            "Reinstalling"
        } else {
            "Installing"
        };
        println!("{verb} {}...", request.source.display());

        let report = Installer::new(self.config).install(request)?;
        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &InstallReport) {
    if report.dry_run {
        println!("Dry run: nothing was written.");
        println!("  id:       {}", report.luid);
        println!("  caption:  {}", report.info.caption);
        println!(
            "  version:  {}",
            report.info.version.as_deref().unwrap_or("(none)")
        );
        println!("  shortcut: {}", report.shortcut_name);
        if let Some(binary) = &report.binary {
            println!("  binary:   {}", binary.display());
        }
        return;
    }

    if let Some(binary) = &report.binary {
        println!("Program: {}", binary.display());
    }
    if let Some(sc_path) = &report.sc_path {
        println!("Shortcut: {}", sc_path.display());
    }
    println!(
        "{} {} ({})",
        "Installed".green().bold(),
        report.info.caption,
        report.luid
    );
    println!("\nTo remove it, run: nopackage remove {}", report.luid);
}
