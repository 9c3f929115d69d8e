//! Foundation types for themecat.
//!
//! Shared by every crate in the workspace: the [`error::CatalogError`] enum
//! and the [`error::Result`] alias.

pub mod error;

pub use error::{CatalogError, Result};
