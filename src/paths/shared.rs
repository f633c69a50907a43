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
use std::fs;
use std::path::{Path, PathBuf};

/// Reduce a name to lowercase ASCII alphanumerics separated by single
/// dashes, for use as one path segment.
pub fn sanitize_segment(value: &str) -> Option<String> {
    let mut output = String::with_capacity(value.len());
    let mut last_dash = false;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            output.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            output.push('-');
            last_dash = true;
        }
    }

    let trimmed = output.trim_matches('-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Ensure the provided path exists, returning it on success.
pub fn ensure_directory(path: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&path).map_err(|error| {
        if error.kind() == std::io::ErrorKind::PermissionDenied {
            NopackageError::PermissionDenied(path.display().to_string())
        } else {
            NopackageError::ConfigError(format!(
                "Failed to create directory {}: {error}",
                path.display()
            ))
        }
    })?;
    Ok(path)
}

/// Join a single directory segment onto the root and ensure the resulting path exists.
pub fn ensure_child_directory(root: &Path, child: &str) -> Result<PathBuf> {
    ensure_directory(root.join(child))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_segment_collapses_separators() {
        assert_eq!(
            sanitize_segment("Ultimaker Cura 4.8.0 (AppImage)"),
            Some("ultimaker-cura-4-8-0-appimage".to_string())
        );
        assert_eq!(sanitize_segment("***"), None);
    }

    #[test]
    fn ensure_child_directory_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let first = ensure_child_directory(temp_dir.path(), "lib64").unwrap();
        let second = ensure_child_directory(temp_dir.path(), "lib64").unwrap();
        assert_eq!(first, second);
    }
}
