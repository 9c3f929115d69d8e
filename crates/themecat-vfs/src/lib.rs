//! Virtual file system abstraction.
//!
//! Theme bundles and the persisted catalog are both addressed with absolute,
//! `/`-separated VFS paths (`/themes/default/theme.json`). [`MemoryVfs`]
//! keeps everything in a map for tests; [`RealVfs`] maps paths under a root
//! directory on disk.

mod memory;
mod real;

pub use memory::MemoryVfs;
pub use real::RealVfs;

use themecat_types::error::{CatalogError, Result};

/// A file tree addressed by absolute `/`-separated paths.
///
/// Implementations must be shareable across threads: bootstrap reads skin
/// documents from several threads at once.
pub trait Vfs: Send + Sync {
    /// Read the whole file at `path`.
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Replace the contents of the file at `path`.
    fn write(&mut self, path: &str, data: &[u8]) -> Result<()>;

    /// Create `path` and any missing parents. Existing directories are fine.
    fn mkdir(&mut self, path: &str) -> Result<()>;

    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Read the file at `path` as UTF-8.
    fn read_to_string(&self, path: &str) -> Result<String> {
        let data = self.read(path)?;
        String::from_utf8(data).map_err(|_| CatalogError::Vfs(format!("not UTF-8: {path}")))
    }
}

/// Reject any path with a `..` segment.
pub(crate) fn validate_path(path: &str) -> Result<()> {
    if path.split('/').any(|seg| seg == "..") {
        return Err(CatalogError::Vfs(format!(
            "path traversal not allowed: {path}"
        )));
    }
    Ok(())
}

/// Return the parent directory of `path` (`/` for top-level entries), or
/// `None` for the root itself.
pub fn parent_dir(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) | None => Some("/"),
        Some(i) => Some(&trimmed[..i]),
    }
}
