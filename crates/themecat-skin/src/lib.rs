//! Theme/skin catalog.
//!
//! A theme is a named presentation bundle with an ordered list of skins. The
//! catalog persists the imported themes, the applied theme, and each
//! wallet's skin. [`ThemeService`] bootstraps the built-in theme from the
//! local resource bundle, seeds or republishes the persisted catalog, and
//! merges themes and skins discovered on a remote theme server.

pub mod bootstrap;
pub mod bundle;
pub mod config;
mod discovery;
pub mod events;
pub mod model;
pub mod publish;
pub mod resolve;
mod selection;
mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

// -----------------------------------------------------------------------
// Public re-exports
// -----------------------------------------------------------------------

pub use bootstrap::{BootstrapDefinition, bootstrap_theme};
pub use bundle::{ResourceBundle, VfsBundle};
pub use config::ThemeConfig;
pub use events::{CatalogEvent, EventBus, Observer, Toast, ToastStyle};
pub use model::{
    Catalog, CatalogMetadata, CatalogPatch, ServiceEndpoint, Skin, SkinHeader, Theme, ThemeHeader,
    View,
};
pub use publish::PublishedState;
pub use resolve::PlaceholderPolicy;
pub use selection::remap_skins_for_theme;
pub use service::ThemeService;
pub use store::{CatalogStore, MemoryCatalogStore, VfsCatalogStore};
