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
use crate::models::{Arch, Platform};
use crate::naming::tables::NamingTables;
use crate::naming::text::{is_all_lowercase, title_case, to_luid};
use crate::naming::tokenizer::{gap_delimiters, split_any};
use crate::naming::version::{VersionSplit, strip_version_prefix, unsplit_version};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions after which a trailing `.tar` is part of the same suffix.
const COMPRESSION_EXTENSIONS: &[&str] = &["gz", "bz2", "xz"];

/// Values the caller already knows and that must not be inferred.
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    pub cased_name: Option<String>,
    pub version: Option<String>,
    pub luid: Option<String>,
    pub caption: Option<String>,
    /// Accept names without a version instead of failing.
    pub dry_run: bool,
}

/// Identity of a program as read from one file or directory name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub path: String,
    pub fname: String,
    #[serde(rename = "casedName")]
    pub cased_name: String,
    pub luid: String,
    pub version: Option<String>,
    pub caption: String,
    pub platform: Option<Platform>,
    pub arch: Option<Arch>,
    /// `-` followed by the packaging annotation, or empty.
    pub suffix: String,
    pub is_dir: bool,
}

impl PackageInfo {
    /// Classify with the built-in tables.
    pub fn classify(source: &str, is_dir: bool, options: &ClassifyOptions) -> Result<Self> {
        Classifier::new(NamingTables::builtin()).classify(source, is_dir, options)
    }

    /// Packaging annotation such as `deb` or `AppImage`.
    pub fn annotation(&self) -> Option<&str> {
        self.suffix.strip_prefix('-').filter(|a| !a.is_empty())
    }

    pub fn bits(&self) -> Option<u32> {
        self.arch.and_then(|arch| arch.bits())
    }

    /// Id that keeps differently packaged or versioned installs of the
    /// same program apart.
    pub fn coexisting_id(&self, multi_package: bool, multi_version: bool) -> String {
        let mut id = self.luid.clone();
        if multi_package {
            id.push_str(&self.suffix);
        }
        if multi_version && let Some(version) = &self.version {
            id.push('-');
            id.push_str(version);
        }
        id
    }
}

/// Remove the package extension from a file name, treating `.tar.gz`,
/// `.tar.bz2` and `.tar.xz` as one unit.
pub fn strip_package_extension(fname: &str) -> &str {
    let Some(dot) = fname.rfind('.') else {
        return fname;
    };
    if fname[..dot].chars().all(|c| c == '.') {
        return fname;
    }
    let stem = &fname[..dot];
    let extension = fname[dot + 1..].to_lowercase();
    if COMPRESSION_EXTENSIONS.contains(&extension.as_str())
        && stem.len() >= 4
        && stem.is_char_boundary(stem.len() - 4)
        && stem[stem.len() - 4..].eq_ignore_ascii_case(".tar")
    {
        return &stem[..stem.len() - 4];
    }
    stem
}

pub struct Classifier<'a> {
    tables: &'a NamingTables,
}

struct Detected {
    split: VersionSplit,
    arch: Option<Arch>,
    platform: Option<(usize, Platform)>,
}

impl<'a> Classifier<'a> {
    pub fn new(tables: &'a NamingTables) -> Self {
        Self { tables }
    }

    pub fn classify(
        &self,
        source: &str,
        is_dir: bool,
        options: &ClassifyOptions,
    ) -> Result<PackageInfo> {
        let fname = Path::new(source)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string());
        let stem = if is_dir {
            fname.as_str()
        } else {
            strip_package_extension(&fname)
        };

        let partial = match stem.char_indices().find(|(_, c)| c.is_alphabetic()) {
            Some((start, _)) => &stem[start..],
            None if options.cased_name.is_some() => stem,
            None => {
                return Err(NopackageError::NameParse {
                    source_name: source.to_string(),
                    reason: "there are no alphabetic characters to start a name".to_string(),
                });
            }
        };
        debug!("Classifying {partial:?} from {source:?}");

        let detected = self.detect(partial);
        let parts = &detected.split.parts;

        let name_end = match (detected.split.version_index, detected.platform) {
            (Some(v), Some((p, _))) => Some(v.min(p)),
            (Some(v), None) => Some(v),
            (None, Some((p, _))) => Some(p),
            (None, None) => None,
        };

        let name = match &options.cased_name {
            Some(name) => name.clone(),
            None => self.name_from_parts(parts, name_end),
        };

        let luid = options.luid.clone().unwrap_or_else(|| to_luid(&name));

        let cased_name = match &options.cased_name {
            Some(name) => name.clone(),
            None => match self.tables.cased_name(&luid) {
                Some(known) => known.to_string(),
                None if is_all_lowercase(&name) => title_case(&name),
                None => name,
            },
        };

        let annotation = if is_dir {
            None
        } else {
            self.tables.annotation_for(&fname)
        };
        let suffix = annotation.map(|a| format!("-{a}")).unwrap_or_default();

        let version = match options.version.clone().or(detected.split.version) {
            Some(version) => Some(version),
            None if options.dry_run => {
                warn!("No version was found in {source:?} (tokens: {parts:?})");
                None
            }
            None => {
                return Err(NopackageError::VersionNotFound {
                    source_name: source.to_string(),
                    tokens: parts.clone(),
                });
            }
        };

        let caption = match &options.caption {
            Some(caption) => caption.clone(),
            None => {
                let mut caption = [Some(cased_name.as_str()), version.as_deref()]
                    .into_iter()
                    .flatten()
                    .filter(|piece| !piece.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                if let Some(annotation) = annotation {
                    let tail = format!(" ({annotation})");
                    if !caption.ends_with(&tail) {
                        caption.push_str(&tail);
                    }
                }
                caption
            }
        };

        Ok(PackageInfo {
            path: source.to_string(),
            fname,
            cased_name,
            luid,
            version,
            caption,
            platform: detected.platform.map(|(_, platform)| platform),
            arch: detected.arch,
            suffix,
            is_dir,
        })
    }

    fn detect(&self, partial: &str) -> Detected {
        let keywords = &self.tables.version_keywords;
        let protected = self.tables.protected_substrings();
        let tokens = split_any(partial, &self.tables.delimiters, &protected);

        if tokens.len() < 2 {
            let none: [&str; 0] = [];
            let dotted = split_any(partial, &['.'], &none);
            return Detected {
                split: unsplit_version(&dotted, keywords, true, None),
                arch: None,
                platform: None,
            };
        }

        let gaps = gap_delimiters(partial, &tokens);
        let tokens: Vec<String> = tokens
            .iter()
            .map(|token| strip_version_prefix(token, keywords).to_string())
            .collect();

        let mut arch = None;
        let mut platform = None;
        for (i, token) in tokens.iter().enumerate() {
            let lower = token.to_lowercase();
            if arch.is_none() {
                arch = self.arch_of(&lower, tokens.get(i + 1).map(String::as_str));
            }
            if platform.is_none() {
                platform = self.platform_of(&lower).map(|platform| (i, platform));
            }
        }

        Detected {
            split: unsplit_version(&tokens, keywords, false, Some(&gaps)),
            arch,
            platform,
        }
    }

    fn arch_of(&self, lower: &str, next: Option<&str>) -> Option<Arch> {
        let contains = |list: &[String]| list.iter().any(|item| item.eq_ignore_ascii_case(lower));
        if lower == "x86" && next == Some("64") {
            Some(Arch::Bit64)
        } else if contains(&self.tables.x64) {
            Some(Arch::Bit64)
        } else if contains(&self.tables.x32) {
            Some(Arch::Bit32)
        } else if contains(&self.tables.noarch) {
            Some(Arch::NoArch)
        } else {
            None
        }
    }

    fn platform_of(&self, lower: &str) -> Option<Platform> {
        let contains = |list: &[String]| list.iter().any(|item| item.eq_ignore_ascii_case(lower));
        if contains(&self.tables.linux) {
            Some(Platform::Linux)
        } else if contains(&self.tables.windows) {
            Some(Platform::Windows)
        } else {
            None
        }
    }

    fn name_from_parts(&self, parts: &[String], name_end: Option<usize>) -> String {
        for exception in &self.tables.hyphenated_names {
            let count = exception.split('-').count();
            if parts.len() >= count && parts[..count].join("-").to_lowercase() == *exception {
                return parts[..count].join("-");
            }
        }
        match name_end {
            // Empty parts come from runs of delimiters such as " - ".
            Some(end) if end > 0 => parts[..end]
                .iter()
                .map(String::as_str)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            _ => {
                let first = parts.first().cloned().unwrap_or_default();
                warn!(
                    "No version or platform was found after the name in {parts:?}, so {first:?} is the name"
                );
                first
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> PackageInfo {
        PackageInfo::classify(name, false, &ClassifyOptions::default()).unwrap()
    }

    fn dir(name: &str) -> PackageInfo {
        PackageInfo::classify(name, true, &ClassifyOptions::default()).unwrap()
    }

    #[test]
    fn strips_compound_archive_extensions() {
        assert_eq!(strip_package_extension("Meshroom-2019.2.0-linux.tar.gz"), "Meshroom-2019.2.0-linux");
        assert_eq!(strip_package_extension("tsetup.1.8.2.TAR.XZ"), "tsetup.1.8.2");
        assert_eq!(strip_package_extension("a.zip"), "a");
        assert_eq!(strip_package_extension("foo.tar"), "foo");
        assert_eq!(strip_package_extension(".bashrc"), ".bashrc");
        assert_eq!(strip_package_extension("noext"), "noext");
    }

    #[test]
    fn deb_gets_annotation_and_cased_name() {
        let info = file("flashprint_4.6.2_amd64.deb");
        assert_eq!(info.luid, "flashprint");
        assert_eq!(info.cased_name, "FlashPrint");
        assert_eq!(info.caption, "FlashPrint 4.6.2 (deb)");
        assert_eq!(info.suffix, "-deb");
        assert_eq!(info.annotation(), Some("deb"));
        assert_eq!(info.arch, Some(Arch::Bit64));
        assert_eq!(info.coexisting_id(true, false), "flashprint-deb");
        assert_eq!(info.coexisting_id(true, true), "flashprint-deb-4.6.2");
        assert_eq!(info.coexisting_id(false, false), "flashprint");
    }

    #[test]
    fn directory_keeps_extension_like_text() {
        let info = dir("someprogram-1.0");
        assert_eq!(info.luid, "someprogram");
        assert_eq!(info.version.as_deref(), Some("1.0"));
        assert_eq!(info.suffix, "");
        assert!(info.is_dir);
    }

    #[test]
    fn bare_x86_followed_by_64_is_64_bit() {
        let info = dir("tool-1.0-x86-64");
        assert_eq!(info.arch, Some(Arch::Bit64));
        assert_eq!(info.bits(), Some(64));
        assert_eq!(dir("tool-1.0-x86").bits(), Some(32));
    }

    #[test]
    fn windows_platform_ends_name() {
        let info = file("Some-Tool-win64-2.1.zip");
        assert_eq!(info.platform, Some(Platform::Windows));
        assert_eq!(info.cased_name, "Some Tool");
        assert_eq!(info.version.as_deref(), Some("2.1"));
    }

    #[test]
    fn hyphenated_exception_keeps_hyphen() {
        let info = dir("ninja-ide-2.4");
        assert_eq!(info.luid, "ninja-ide");
        assert_eq!(info.cased_name, "Ninja-IDE");
        assert_eq!(info.caption, "Ninja-IDE 2.4");
    }

    #[test]
    fn missing_version_fails_unless_dry_run() {
        let err = PackageInfo::classify("some-program.AppImage", false, &ClassifyOptions::default())
            .unwrap_err();
        assert!(matches!(err, NopackageError::VersionNotFound { .. }));

        let options = ClassifyOptions {
            dry_run: true,
            ..Default::default()
        };
        let info = PackageInfo::classify("some-program.AppImage", false, &options).unwrap();
        assert_eq!(info.version, None);
        assert_eq!(info.cased_name, "Some");
        assert_eq!(info.caption, "Some (AppImage)");
    }

    #[test]
    fn overrides_win_over_detection() {
        let options = ClassifyOptions {
            cased_name: Some("My Tool".to_string()),
            version: Some("9".to_string()),
            ..Default::default()
        };
        let info = PackageInfo::classify("whatever-1.0.AppImage", false, &options).unwrap();
        assert_eq!(info.cased_name, "My Tool");
        assert_eq!(info.luid, "my.tool");
        assert_eq!(info.caption, "My Tool 9 (AppImage)");

        let options = ClassifyOptions {
            caption: Some("Custom".to_string()),
            luid: Some("custom.id".to_string()),
            ..Default::default()
        };
        let info = PackageInfo::classify("whatever-1.0.AppImage", false, &options).unwrap();
        assert_eq!(info.caption, "Custom");
        assert_eq!(info.luid, "custom.id");
    }

    #[test]
    fn name_override_allows_digit_only_source() {
        let options = ClassifyOptions {
            cased_name: Some("Numbers".to_string()),
            ..Default::default()
        };
        let info = PackageInfo::classify("4.9_20210511-4.9.1.AppImage", false, &options).unwrap();
        assert_eq!(info.cased_name, "Numbers");
        assert!(info.version.is_some());
    }

    #[test]
    fn injected_tables_are_used() {
        let mut tables = NamingTables::default();
        tables.cased_names.insert("blender".to_string(), "BLENDER".to_string());
        let classifier = Classifier::new(&tables);
        let info = classifier
            .classify("blender-3.0.1-linux-x64", true, &ClassifyOptions::default())
            .unwrap();
        assert_eq!(info.cased_name, "BLENDER");
    }

    #[test]
    fn record_serializes_with_cased_name_key() {
        let info = file("Mirage-v0.6.4-x86_64.AppImage");
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["casedName"], "Mirage");
        assert_eq!(json["arch"], "64bit");
    }
}
