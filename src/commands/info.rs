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
use crate::naming::{ClassifyOptions, Classifier, PackageInfo};

pub struct InfoCommand<'a> {
    config: &'a NopackageConfig,
}

impl<'a> InfoCommand<'a> {
    pub fn new(config: &'a NopackageConfig) -> Result<Self> {
        Ok(Self { config })
    }

    /// Classify a name without touching the filesystem.
    pub fn classify(
        &self,
        name: &str,
        is_dir: bool,
        version: Option<&str>,
        cased_name: Option<&str>,
    ) -> Result<PackageInfo> {
        let tables = self.config.naming_tables();
        let options = ClassifyOptions {
            cased_name: cased_name.map(str::to_string),
            version: version.map(str::to_string),
            dry_run: true,
            ..Default::default()
        };
        Classifier::new(&tables).classify(name, is_dir, &options)
    }

    pub fn execute(
        &self,
        name: &str,
        is_dir: bool,
        json: bool,
        version: Option<&str>,
        cased_name: Option<&str>,
    ) -> Result<()> {
        let info = self.classify(name, is_dir, version, cased_name)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&info)?);
            return Ok(());
        }

        let optional = |value: Option<String>| value.unwrap_or_else(|| "(none)".to_string());
        println!("path:     {}", info.path);
        println!("fname:    {}", info.fname);
        println!("casedName: {}", info.cased_name);
        println!("luid:     {}", info.luid);
        println!("version:  {}", optional(info.version.clone()));
        println!("caption:  {}", info.caption);
        println!("platform: {}", optional(info.platform.map(|p| p.to_string())));
        println!("arch:     {}", optional(info.arch.map(|a| a.to_string())));
        println!("bits:     {}", optional(info.bits().map(|b| b.to_string())));
        println!("suffix:   {}", info.suffix);
        println!("is_dir:   {}", info.is_dir);
        Ok(())
    }
}
