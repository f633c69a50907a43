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
use crate::platform::file_ops;
use crate::paths::shared::ensure_directory;
use log::{debug, info, warn};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const DESKTOP_MENU_TOOL: &str = "xdg-desktop-menu";
const SHORTCUT_MODE: u32 = 0o644;

/// Places desktop entries in the applications directory, through
/// `xdg-desktop-menu` when it is available.
pub struct ShortcutInstaller {
    applications_dir: PathBuf,
    desktop_menu: Option<PathBuf>,
}

impl ShortcutInstaller {
    pub fn new(applications_dir: PathBuf, use_desktop_menu: bool) -> Self {
        // The tool only knows the user's XDG data dir
        let is_xdg_location = dirs::data_dir()
            .map(|data| data.join("applications") == applications_dir)
            .unwrap_or(false);

        let desktop_menu = if use_desktop_menu && is_xdg_location {
            match which::which(DESKTOP_MENU_TOOL) {
                Ok(path) => Some(path),
                Err(e) => {
                    debug!("{DESKTOP_MENU_TOOL} not found ({e}), writing shortcuts directly");
                    None
                }
            }
        } else {
            None
        };

        Self {
            applications_dir,
            desktop_menu,
        }
    }

    pub fn shortcut_path(&self, name: &str) -> PathBuf {
        self.applications_dir.join(name)
    }

    /// Install `contents` as `name` and return the shortcut path.
    pub fn install(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let sc_path = self.shortcut_path(name);
        ensure_directory(self.applications_dir.clone())?;

        if let Some(tool) = &self.desktop_menu {
            // Uninstall first, otherwise the menu keeps the cached icon
            if sc_path.exists() {
                self.run_tool(tool, &[OsStr::new("uninstall"), sc_path.as_os_str()]);
            }

            let staging = tempfile::tempdir()?;
            let staged = staging.path().join(name);
            fs::write(&staged, contents)?;
            let ok = self.run_tool(
                tool,
                &[OsStr::new("install"), OsStr::new("--novendor"), staged.as_os_str()],
            );
            if !ok || !sc_path.exists() {
                warn!(
                    "{DESKTOP_MENU_TOOL} did not create {}, writing it directly",
                    sc_path.display()
                );
                fs::write(&sc_path, contents)?;
            }
        } else {
            fs::write(&sc_path, contents)?;
        }

        file_ops::set_permissions_from_mode(&sc_path, SHORTCUT_MODE).map_err(|e| {
            NopackageError::Shortcut(format!(
                "Failed to set permissions on {}: {e}",
                sc_path.display()
            ))
        })?;
        info!("Installed shortcut {}", sc_path.display());
        Ok(sc_path)
    }

    /// Remove a shortcut. Returns whether one was present.
    pub fn uninstall(&self, sc_path: &Path) -> Result<bool> {
        if !sc_path.is_file() {
            debug!("The shortcut was not present: {}", sc_path.display());
            return Ok(false);
        }

        if let Some(tool) = &self.desktop_menu {
            self.run_tool(tool, &[OsStr::new("uninstall"), sc_path.as_os_str()]);
        }
        if sc_path.is_file() {
            fs::remove_file(sc_path)?;
        }
        info!("Removed shortcut {}", sc_path.display());
        Ok(true)
    }

    fn run_tool(&self, tool: &Path, args: &[&OsStr]) -> bool {
        debug!("Running {} {args:?}", tool.display());
        match Command::new(tool).args(args).status() {
            Ok(status) if status.success() => true,
            Ok(status) => {
                warn!("{DESKTOP_MENU_TOOL} exited with {status}");
                false
            }
            Err(e) => {
                warn!("Failed to run {DESKTOP_MENU_TOOL}: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_direct_install_and_uninstall() {
        let temp_dir = TempDir::new().unwrap();
        let applications = temp_dir.path().join("share/applications");
        let installer = ShortcutInstaller::new(applications.clone(), false);

        let sc_path = installer
            .install("mirage.desktop", "[Desktop Entry]\nName=Mirage\n")
            .unwrap();
        assert_eq!(sc_path, applications.join("mirage.desktop"));
        assert_eq!(
            fs::read_to_string(&sc_path).unwrap(),
            "[Desktop Entry]\nName=Mirage\n"
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&sc_path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }

        assert!(installer.uninstall(&sc_path).unwrap());
        assert!(!sc_path.exists());
        assert!(!installer.uninstall(&sc_path).unwrap());
    }

    #[test]
    fn test_reinstall_overwrites_shortcut() {
        let temp_dir = TempDir::new().unwrap();
        let installer = ShortcutInstaller::new(temp_dir.path().to_path_buf(), false);
        installer.install("a.desktop", "old\n").unwrap();
        let sc_path = installer.install("a.desktop", "new\n").unwrap();
        assert_eq!(fs::read_to_string(sc_path).unwrap(), "new\n");
    }
}
