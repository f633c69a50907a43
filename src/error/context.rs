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

use crate::error::NopackageError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a NopackageError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a NopackageError) -> Self {
        let (suggestion, details) = match error {
            NopackageError::NameParse { reason, .. } => {
                let suggestion = Some(
                    "Give the program name explicitly with --name (e.g., --name \"Ultimaker Cura\")."
                        .to_string(),
                );
                let details = Some(reason.clone());
                (suggestion, details)
            }
            NopackageError::VersionNotFound { tokens, .. } => {
                let suggestion = Some(
                    "Give the version explicitly with --version, or use --dry-run to continue \
                     without one."
                        .to_string(),
                );
                let details = Some(format!("Name parts: {}", tokens.join(", ")));
                (suggestion, details)
            }
            NopackageError::ProgramNotFound(luid) => {
                let suggestion = Some(format!(
                    "Run 'nopackage list' to see installed programs, then remove by id instead \
                     of '{luid}'."
                ));
                (suggestion, None)
            }
            NopackageError::BinaryNotFound { dir, candidates } => {
                let suggestion = Some(format!(
                    "Install the binary itself instead of the folder (e.g., nopackage install \
                     {dir}/<program>)."
                ));
                let details = if candidates.is_empty() {
                    Some("No executable scripts or binaries were found.".to_string())
                } else {
                    Some(format!(
                        "Candidates:\n{}",
                        candidates
                            .iter()
                            .map(|c| format!("  - {c}"))
                            .collect::<Vec<_>>()
                            .join("\n")
                    ))
                };
                (suggestion, details)
            }
            NopackageError::Extract(msg) => {
                let suggestion =
                    Some("Ensure the archive is complete and you have enough disk space.".to_string());
                let details = Some(format!("Extraction failed: {msg}"));
                (suggestion, details)
            }
            NopackageError::UnsupportedSource(msg) => {
                let suggestion = Some(
                    "Supported sources: AppImage, .deb, .tar.gz, .tar.bz2, .tar.xz, .zip, a \
                     folder, or a single executable."
                        .to_string(),
                );
                (suggestion, Some(msg.clone()))
            }
            NopackageError::AlreadyExists(_) => {
                let suggestion = Some(
                    "Use 'nopackage reinstall' to replace the existing installation.".to_string(),
                );
                (suggestion, None)
            }
            NopackageError::Shortcut(msg) => {
                let suggestion = Some(
                    "Check that xdg-desktop-menu works, or disable it with \
                     NOPACKAGE_INSTALL__USE_XDG_DESKTOP_MENU=false."
                        .to_string(),
                );
                (suggestion, Some(msg.clone()))
            }
            NopackageError::ConfigFile(msg) | NopackageError::ConfigError(msg) => {
                let suggestion = Some(
                    "Check config.toml in the nopackage config directory (or NOPACKAGE_HOME)."
                        .to_string(),
                );
                (suggestion, Some(msg.clone()))
            }
            NopackageError::Registry(msg) => {
                let suggestion = Some(
                    "local_machine.json may be damaged. Fix or move it aside and reinstall."
                        .to_string(),
                );
                (suggestion, Some(msg.clone()))
            }
            NopackageError::PermissionDenied(path) => {
                let suggestion = if cfg!(unix) {
                    Some(format!(
                        "Check the ownership and permissions of {path}. nopackage installs per \
                         user and never needs sudo."
                    ))
                } else {
                    Some(format!("Check that you can write to {path}."))
                };
                (suggestion, None)
            }
            NopackageError::SecurityError(msg) => {
                let suggestion =
                    Some("The archive may be malicious. Do not install it.".to_string());
                (suggestion, Some(msg.clone()))
            }
            _ => (None, None),
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
