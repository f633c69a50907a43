use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// Creates a test home directory under target/home with a random 8-character name
/// Returns the path to the created directory
/// The directory will be automatically cleaned up when the returned guard is dropped
pub struct TestHomeGuard {
    path: PathBuf,
}

impl TestHomeGuard {
    pub fn new() -> Self {
        let random_name: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();

        // NOPACKAGE_HOME must be absolute
        let path = std::env::current_dir()
            .expect("Failed to read current directory")
            .join("target/home")
            .join(random_name);
        fs::create_dir_all(&path).expect("Failed to create test home directory");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding config.toml and local_machine.json.
    pub fn nopackage_home(&self) -> PathBuf {
        self.path.join("config")
    }

    /// Install prefix standing in for ~/.local.
    pub fn prefix(&self) -> PathBuf {
        self.path.join("prefix")
    }

    /// Write a config.toml pointing the prefix inside this home.
    pub fn setup_nopackage_structure(&self) -> &Self {
        let home = self.nopackage_home();
        fs::create_dir_all(&home).expect("Failed to create config directory");
        fs::create_dir_all(self.prefix()).expect("Failed to create prefix directory");
        let config = format!(
            "[install]\nprefix = {:?}\nuse_xdg_desktop_menu = false\n",
            self.prefix().display().to_string()
        );
        fs::write(home.join("config.toml"), config).expect("Failed to write config.toml");
        self
    }
}

impl Drop for TestHomeGuard {
    fn drop(&mut self) {
        if self.path.exists() {
            fs::remove_dir_all(&self.path).unwrap_or_else(|e| {
                eprintln!(
                    "Failed to cleanup test directory {}: {}",
                    self.path.display(),
                    e
                );
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_and_cleans_up_directory() {
        let test_path = {
            let guard = TestHomeGuard::new();
            let path = guard.path().to_path_buf();
            assert!(path.exists());
            assert!(path.is_absolute());
            path
        };
        // After guard is dropped, directory should be cleaned up
        assert!(!test_path.exists());
    }

    #[test]
    fn test_setup_nopackage_structure() {
        let guard = TestHomeGuard::new();
        let guard = guard.setup_nopackage_structure();

        assert!(guard.nopackage_home().join("config.toml").exists());
        assert!(guard.prefix().exists());
    }
}
