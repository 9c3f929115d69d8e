//! In-memory VFS implementation.
//!
//! Used by tests and by embedders that ship theme bundles compiled into the
//! binary. Keys are normalized absolute paths.

use std::borrow::Cow;
use std::collections::BTreeMap;

use themecat_types::error::{CatalogError, Result};

use crate::{Vfs, parent_dir, validate_path};

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

/// A fully in-memory file tree.
#[derive(Debug, Clone)]
pub struct MemoryVfs {
    nodes: BTreeMap<String, Node>,
}

impl MemoryVfs {
    /// Create an empty tree holding only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir);
        Self { nodes }
    }

    /// Builder-style helper: create the parents of `path` and store
    /// `contents` there.
    pub fn with_file(mut self, path: &str, contents: impl AsRef<[u8]>) -> Result<Self> {
        if let Some(par) = parent_dir(&normalize(path)) {
            self.mkdir(par)?;
        }
        self.write(path, contents.as_ref())?;
        Ok(self)
    }

    /// Number of files (directories excluded).
    pub fn file_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| matches!(n, Node::File(_)))
            .count()
    }
}

impl Default for MemoryVfs {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a path: ensure a leading `/`, collapse `//`, strip a trailing
/// `/` (except for root). Borrows when the input is already normal.
fn normalize(path: &str) -> Cow<'_, str> {
    let already = path.starts_with('/')
        && !path.contains("//")
        && (path.len() == 1 || !path.ends_with('/'));
    if already {
        return Cow::Borrowed(path);
    }
    let mut out = String::with_capacity(path.len() + 1);
    for seg in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(seg);
    }
    if out.is_empty() {
        out.push('/');
    }
    Cow::Owned(out)
}

impl Vfs for MemoryVfs {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let path = normalize(path);
        match self.nodes.get(path.as_ref()) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Dir) => Err(CatalogError::Vfs(format!("is a directory: {path}"))),
            None => Err(CatalogError::Vfs(format!("no such file: {path}"))),
        }
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
        validate_path(path)?;
        let path = normalize(path);
        let par = parent_dir(&path)
            .ok_or_else(|| CatalogError::Vfs("cannot write to root".to_string()))?;
        match self.nodes.get(par) {
            Some(Node::Dir) => {},
            Some(Node::File(_)) => {
                return Err(CatalogError::Vfs(format!("not a directory: {par}")));
            },
            None => {
                return Err(CatalogError::Vfs(format!(
                    "parent directory does not exist: {par}"
                )));
            },
        }
        if let Some(Node::Dir) = self.nodes.get(path.as_ref()) {
            return Err(CatalogError::Vfs(format!("is a directory: {path}")));
        }
        self.nodes
            .insert(path.into_owned(), Node::File(data.to_vec()));
        Ok(())
    }

    fn mkdir(&mut self, path: &str) -> Result<()> {
        validate_path(path)?;
        let path = normalize(path);
        match self.nodes.get(path.as_ref()) {
            Some(Node::Dir) => return Ok(()),
            Some(Node::File(_)) => {
                return Err(CatalogError::Vfs(format!("file exists: {path}")));
            },
            None => {},
        }
        if let Some(par) = parent_dir(&path) {
            let par = par.to_string();
            self.mkdir(&par)?;
        }
        self.nodes.insert(path.into_owned(), Node::Dir);
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.nodes.contains_key(normalize(path).as_ref())
    }
}
