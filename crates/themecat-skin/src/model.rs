//! Catalog data model.
//!
//! Field names serialize in `camelCase` so the persisted catalog keeps the
//! layout existing installs already have on disk:
//!
//! ```json
//! { "themeId": 0, "themes": [...], "skinFor": { "wallet": 1 },
//!   "service": { "url": "..." },
//!   "metadata": { "themeSchemaVersion": 1, "skinSchemaVersion": 1 } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Presentation properties of a theme or skin. Opaque to the catalog except
/// for the few style hints used to colour notifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct View(pub Map<String, Value>);

impl View {
    /// String property `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Skin highlight colour used for success toasts.
    pub fn text_highlight_color(&self) -> Option<&str> {
        self.get_str("textHighlightColor")
    }

    pub fn notification_bar_icon_color(&self) -> Option<&str> {
        self.get_str("notificationBarIconColor")
    }

    pub fn notification_bar_background(&self) -> Option<&str> {
        self.get_str("notificationBarBackground")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeHeader {
    /// Unique key within the catalog.
    pub name: String,
    #[serde(default)]
    pub schema_version: u32,
    /// Index into [`Theme::skins`].
    #[serde(default)]
    pub default_skin_id: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub header: ThemeHeader,
    #[serde(default)]
    pub skins: Vec<Skin>,
    #[serde(default)]
    pub view: View,
}

impl Theme {
    /// Position of the skin named `name`, or the append position when the
    /// theme has no such skin.
    pub fn skin_index(&self, name: &str) -> usize {
        self.skins
            .iter()
            .position(|s| s.header.name == name)
            .unwrap_or(self.skins.len())
    }

    /// The skin `defaultSkinId` points at.
    pub fn default_skin(&self) -> Option<&Skin> {
        self.skins.get(self.header.default_skin_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinHeader {
    /// Unique key within a theme.
    pub name: String,
    #[serde(default)]
    pub schema_version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub header: SkinHeader,
    #[serde(default)]
    pub view: View,
}

/// Where remote themes are discovered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    #[serde(default)]
    pub url: String,
}

/// Schema versions this build accepts. Discovery admits exact matches only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetadata {
    pub theme_schema_version: u32,
    pub skin_schema_version: u32,
}

impl Default for CatalogMetadata {
    fn default() -> Self {
        Self {
            theme_schema_version: 1,
            skin_schema_version: 1,
        }
    }
}

/// The persisted catalog root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Index into `themes` of the applied theme.
    #[serde(default)]
    pub theme_id: usize,
    #[serde(default)]
    pub themes: Vec<Theme>,
    /// Wallet id -> skin id within the applied theme.
    #[serde(default)]
    pub skin_for: BTreeMap<String, usize>,
    #[serde(default)]
    pub service: ServiceEndpoint,
    #[serde(default)]
    pub metadata: CatalogMetadata,
}

impl Catalog {
    /// The applied theme, if `theme_id` is in range.
    pub fn current_theme(&self) -> Option<&Theme> {
        self.themes.get(self.theme_id)
    }

    /// Position of the theme named `name`.
    pub fn theme_index(&self, name: &str) -> Option<usize> {
        self.themes.iter().position(|t| t.header.name == name)
    }

    /// Apply `patch`: every field it carries replaces the catalog's field
    /// wholesale (shallow merge).
    pub fn merge(&mut self, patch: CatalogPatch) {
        if let Some(theme_id) = patch.theme_id {
            self.theme_id = theme_id;
        }
        if let Some(themes) = patch.themes {
            self.themes = themes;
        }
        if let Some(skin_for) = patch.skin_for {
            self.skin_for = skin_for;
        }
        if let Some(service) = patch.service {
            self.service = service;
        }
        if let Some(metadata) = patch.metadata {
            self.metadata = metadata;
        }
    }
}

/// A partial catalog for [`crate::store::CatalogStore::set`]. `None` fields
/// are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPatch {
    pub theme_id: Option<usize>,
    pub themes: Option<Vec<Theme>>,
    pub skin_for: Option<BTreeMap<String, usize>>,
    pub service: Option<ServiceEndpoint>,
    pub metadata: Option<CatalogMetadata>,
}

impl CatalogPatch {
    pub fn theme_id(theme_id: usize) -> Self {
        Self {
            theme_id: Some(theme_id),
            ..Self::default()
        }
    }

    pub fn themes(themes: Vec<Theme>) -> Self {
        Self {
            themes: Some(themes),
            ..Self::default()
        }
    }

    pub fn skin_for(skin_for: BTreeMap<String, usize>) -> Self {
        Self {
            skin_for: Some(skin_for),
            ..Self::default()
        }
    }
}

/// `{ "data": [...] }` envelope used by the theme server's listing endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HeaderListing<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}
