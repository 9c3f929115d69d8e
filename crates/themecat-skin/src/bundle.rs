//! Local resource bundles: where bootstrap theme and skin documents live.

use serde_json::Value;

use themecat_types::error::{CatalogError, Result};
use themecat_vfs::Vfs;

/// Read-only access to the application's bundled resources.
///
/// Shared across the bootstrap worker threads, hence `Sync`.
pub trait ResourceBundle: Send + Sync {
    /// URL of the application directory; prefixes every local resource path.
    fn base_url(&self) -> &str;

    /// Read and parse the JSON document at `path` (e.g.
    /// `/themes/default/theme.json`).
    fn load(&self, path: &str) -> Result<Value>;
}

/// [`ResourceBundle`] backed by a [`Vfs`].
pub struct VfsBundle<V: Vfs> {
    vfs: V,
    base_url: String,
}

impl<V: Vfs> VfsBundle<V> {
    pub fn new(vfs: V, base_url: impl Into<String>) -> Self {
        Self {
            vfs,
            base_url: base_url.into(),
        }
    }
}

impl<V: Vfs> ResourceBundle for VfsBundle<V> {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn load(&self, path: &str) -> Result<Value> {
        let bytes = self
            .vfs
            .read(path)
            .map_err(|e| CatalogError::Load(format!("{path}: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CatalogError::Load(format!("{path}: malformed JSON: {e}")))
    }
}
