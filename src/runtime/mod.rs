//! Runtime abstraction for system operations.
//!
//! Repositories and projects touch the file system only through this trait,
//! so they can be exercised against `MockRuntime` in tests.
//!
//! # Structure
//!
//! - `path` - Path utility functions (normalize, is_path_under, relative paths)
//! - `env` - Working directory and well-known directories
//! - `fs` - File system operations (read, write, directory)

mod env;
mod fs;
pub mod path;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use path::{is_path_under, relative_path_from_dir, resolve_relative_path};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn current_dir(&self) -> Result<PathBuf>;

    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    // Directories
    fn config_dir(&self) -> Option<PathBuf>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir_impl()
    }
}

/// Write `contents` to `path`, creating the parent directory first.
pub fn write_with_parent<R: Runtime + ?Sized>(
    runtime: &R,
    path: &Path,
    contents: &[u8],
) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !runtime.exists(parent)
    {
        runtime.create_dir_all(parent)?;
    }
    runtime.write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_write_with_parent_creates_missing_directory() {
        let mut runtime = MockRuntime::new();
        let parent = PathBuf::from("/solution/packages");
        let file = parent.join("repositories.json");

        runtime
            .expect_exists()
            .with(eq(parent.clone()))
            .returning(|_| false);
        runtime
            .expect_create_dir_all()
            .with(eq(parent.clone()))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_write()
            .withf(move |path, contents| path == file && contents == b"[]")
            .times(1)
            .returning(|_, _| Ok(()));

        write_with_parent(&runtime, Path::new("/solution/packages/repositories.json"), b"[]")
            .unwrap();
    }

    #[test]
    fn test_write_with_parent_skips_existing_directory() {
        let mut runtime = MockRuntime::new();

        runtime.expect_exists().returning(|_| true);
        runtime.expect_create_dir_all().never();
        runtime.expect_write().times(1).returning(|_, _| Ok(()));

        write_with_parent(&runtime, Path::new("/solution/project/packages.json"), b"{}").unwrap();
    }
}
