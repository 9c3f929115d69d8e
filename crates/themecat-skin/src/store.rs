//! Catalog persistence.
//!
//! The store owns the durable catalog. [`CatalogStore::set`] is a shallow
//! merge: each field the patch carries replaces the stored field wholesale,
//! so callers updating `skinFor` pass the complete map.

use themecat_types::error::{CatalogError, Result};
use themecat_vfs::{Vfs, parent_dir};

use crate::model::{Catalog, CatalogPatch};

/// Durable keyed storage for the catalog.
pub trait CatalogStore: Send {
    /// Read the durable catalog and refresh the cache.
    fn get(&mut self) -> Result<&Catalog>;

    /// Merge `patch` into the catalog and persist it. On failure the cache
    /// is unchanged.
    fn set(&mut self, patch: CatalogPatch) -> Result<()>;

    /// The cached catalog as of the last successful `get` or `set`. No I/O.
    fn get_sync(&self) -> &Catalog;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A [`CatalogStore`] that never touches disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogStore {
    catalog: Catalog,
}

impl MemoryCatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn get(&mut self) -> Result<&Catalog> {
        Ok(&self.catalog)
    }

    fn set(&mut self, patch: CatalogPatch) -> Result<()> {
        self.catalog.merge(patch);
        Ok(())
    }

    fn get_sync(&self) -> &Catalog {
        &self.catalog
    }
}

// ---------------------------------------------------------------------------
// VFS-backed store
// ---------------------------------------------------------------------------

/// Persists the catalog as pretty-printed JSON at one VFS path.
pub struct VfsCatalogStore<V: Vfs> {
    vfs: V,
    path: String,
    /// Returned by `get` while nothing has been persisted yet.
    defaults: Catalog,
    cache: Catalog,
}

impl<V: Vfs> VfsCatalogStore<V> {
    pub fn new(vfs: V, path: impl Into<String>, defaults: Catalog) -> Self {
        Self {
            vfs,
            path: path.into(),
            cache: defaults.clone(),
            defaults,
        }
    }

    #[cfg(test)]
    fn vfs(&self) -> &V {
        &self.vfs
    }

    fn store_error(&self, err: impl std::fmt::Display) -> CatalogError {
        CatalogError::Store(format!("{}: {err}", self.path))
    }
}

impl<V: Vfs> CatalogStore for VfsCatalogStore<V> {
    fn get(&mut self) -> Result<&Catalog> {
        if !self.vfs.exists(&self.path) {
            log::debug!("No catalog at {}; using defaults", self.path);
            self.cache = self.defaults.clone();
            return Ok(&self.cache);
        }
        let data = self.vfs.read(&self.path).map_err(|e| self.store_error(e))?;
        self.cache = serde_json::from_slice(&data).map_err(|e| self.store_error(e))?;
        Ok(&self.cache)
    }

    fn set(&mut self, patch: CatalogPatch) -> Result<()> {
        let mut next = self.cache.clone();
        next.merge(patch);
        let data = serde_json::to_vec_pretty(&next).map_err(|e| self.store_error(e))?;

        if let Some(dir) = parent_dir(&self.path) {
            let dir = dir.to_string();
            self.vfs.mkdir(&dir).map_err(|e| self.store_error(e))?;
        }
        self.vfs
            .write(&self.path, &data)
            .map_err(|e| self.store_error(e))?;
        log::debug!("Catalog written to {} ({} bytes)", self.path, data.len());
        self.cache = next;
        Ok(())
    }

    fn get_sync(&self) -> &Catalog {
        &self.cache
    }
}
