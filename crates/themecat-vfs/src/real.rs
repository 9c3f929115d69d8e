//! On-disk VFS rooted at a host directory.
//!
//! VFS path `/themes/default/theme.json` maps to
//! `<root>/themes/default/theme.json`. Writes go to a sibling temp file that
//! is renamed over the target, so a crash mid-write never leaves a truncated
//! catalog behind.

use std::fs;
use std::path::{Path, PathBuf};

use themecat_types::error::{CatalogError, Result};

use crate::{Vfs, validate_path};

/// A VFS backed by a directory on the host file system.
#[derive(Debug, Clone)]
pub struct RealVfs {
    root: PathBuf,
}

impl RealVfs {
    /// Create a VFS rooted at `root`. The directory does not have to exist
    /// until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The host directory this VFS is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, path: &str) -> Result<PathBuf> {
        validate_path(path)?;
        let mut host = self.root.clone();
        for seg in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            host.push(seg);
        }
        Ok(host)
    }
}

impl Vfs for RealVfs {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let host = self.host_path(path)?;
        fs::read(&host).map_err(|e| CatalogError::Vfs(format!("{}: {e}", host.display())))
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let host = self.host_path(path)?;
        if let Some(dir) = host.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut tmp = host.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, data)
            .map_err(|e| CatalogError::Vfs(format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, &host).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            CatalogError::Vfs(format!("rename to {}: {e}", host.display()))
        })?;
        log::debug!("Wrote {} bytes to {}", data.len(), host.display());
        Ok(())
    }

    fn mkdir(&mut self, path: &str) -> Result<()> {
        let host = self.host_path(path)?;
        fs::create_dir_all(&host)?;
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.host_path(path).is_ok_and(|p| p.exists())
    }
}
