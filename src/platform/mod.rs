//! Filesystem operations that differ between platforms.

pub mod file_ops;

pub use file_ops::{copy_dir_all, make_executable, move_path, set_permissions_from_mode};
