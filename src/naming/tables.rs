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

//! Lookup tables consulted while classifying artifact names.
//!
//! The tables are plain data. A [`NamingTables`] value is built once (from
//! the built-in defaults, optionally extended by configuration) and then
//! handed to the classifier by reference.

use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const DEFAULT_DELIMITERS: &[char] = &['_', '-', ' ', '+'];

pub const X64_TOKENS: &[&str] = &[
    "x64", "64bit", "linux64", "win64", "windows64", "64-bit", "x86_64", "amd64",
];

pub const X32_TOKENS: &[&str] = &[
    "x32", "686", "386", "i386", "i686", "32bit", "32-bit", "windows32", "win32", "x86",
];

pub const NOARCH_TOKENS: &[&str] = &["noarch"];

pub const LINUX_TOKENS: &[&str] = &["linux", "linux64", "linux32"];

pub const WINDOWS_TOKENS: &[&str] = &["windows", "windows64", "windows32", "win64", "win32"];

pub const VERSION_KEYWORDS: &[&str] = &[
    "master", "dev", "prealpha", "alpha", "beta", "rc", "mono", "stable",
];

pub const CASED_NAMES: &[(&str, &str)] = &[
    ("umlet", "UMLet Standalone"),
    ("freecad", "FreeCAD"),
    ("android.studio.ide", "Android Studio IDE"),
    ("flashprint", "FlashPrint"),
    ("argouml", "ArgoUML"),
    ("ninja-ide", "Ninja-IDE"),
];

pub const HYPHENATED_NAMES: &[&str] = &["ninja-ide"];

/// File endings (lowercase) that mark a packaging format worth showing.
pub const ANNOTATIONS: &[(&str, &str)] = &[(".deb", "deb"), (".appimage", "AppImage")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTables {
    pub delimiters: Vec<char>,
    pub x64: Vec<String>,
    pub x32: Vec<String>,
    pub noarch: Vec<String>,
    pub linux: Vec<String>,
    pub windows: Vec<String>,
    pub version_keywords: Vec<String>,
    pub cased_names: BTreeMap<String, String>,
    pub hyphenated_names: Vec<String>,
    pub annotations: Vec<(String, String)>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Default for NamingTables {
    fn default() -> Self {
        Self {
            delimiters: DEFAULT_DELIMITERS.to_vec(),
            x64: owned(X64_TOKENS),
            x32: owned(X32_TOKENS),
            noarch: owned(NOARCH_TOKENS),
            linux: owned(LINUX_TOKENS),
            windows: owned(WINDOWS_TOKENS),
            version_keywords: owned(VERSION_KEYWORDS),
            cased_names: CASED_NAMES
                .iter()
                .map(|(luid, name)| (luid.to_string(), name.to_string()))
                .collect(),
            hyphenated_names: owned(HYPHENATED_NAMES),
            annotations: ANNOTATIONS
                .iter()
                .map(|(ending, annotation)| (ending.to_string(), annotation.to_string()))
                .collect(),
        }
    }
}

impl NamingTables {
    /// Shared instance of the built-in tables.
    pub fn builtin() -> &'static NamingTables {
        static BUILTIN: OnceLock<NamingTables> = OnceLock::new();
        BUILTIN.get_or_init(NamingTables::default)
    }

    /// Every architecture token, 64-bit first, in the order the tokenizer
    /// must try them as protected substrings.
    pub fn protected_substrings(&self) -> Vec<&str> {
        self.x64
            .iter()
            .chain(self.x32.iter())
            .chain(self.noarch.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn primary_delimiter(&self) -> Option<char> {
        self.delimiters.first().copied()
    }

    pub fn is_version_keyword(&self, token: &str) -> bool {
        self.version_keywords
            .iter()
            .any(|keyword| keyword.eq_ignore_ascii_case(token))
    }

    pub fn cased_name(&self, luid: &str) -> Option<&str> {
        self.cased_names.get(luid).map(String::as_str)
    }

    /// Packaging annotation for a file name, matched on its lowercase ending.
    pub fn annotation_for(&self, file_name: &str) -> Option<&str> {
        let lower = file_name.to_lowercase();
        self.annotations
            .iter()
            .find(|(ending, _)| lower.ends_with(ending.as_str()))
            .map(|(_, annotation)| annotation.as_str())
    }

    /// Add configured entries on top of the current tables. Existing
    /// entries are kept, cased names are overwritten by key.
    pub fn extend(
        &mut self,
        cased_names: &BTreeMap<String, String>,
        hyphenated_names: &[String],
        version_keywords: &[String],
    ) {
        for (luid, name) in cased_names {
            self.cased_names.insert(luid.to_lowercase(), name.clone());
        }
        for name in hyphenated_names {
            let name = name.to_lowercase();
            if !self.hyphenated_names.contains(&name) {
                self.hyphenated_names.push(name);
            }
        }
        for keyword in version_keywords {
            let keyword = keyword.to_lowercase();
            if !self.version_keywords.contains(&keyword) {
                self.version_keywords.push(keyword);
            }
        }
    }
}
