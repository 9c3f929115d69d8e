//! Published presentation state.
//!
//! A [`PublishedState`] is an immutable projection of the catalog for one
//! wallet. The service rebuilds it after every committed write and hands the
//! same `Arc` to observers, so readers never see a half-applied change.

use crate::events::ToastStyle;
use crate::model::{Catalog, Skin, Theme};
use themecat_types::error::{CatalogError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedState {
    themes: Vec<Theme>,
    theme_id: usize,
    skin_id: usize,
    wallet_id: String,
}

impl PublishedState {
    /// Snapshot `themes` with the given selection. Both ids must be in range.
    pub fn new(
        themes: Vec<Theme>,
        theme_id: usize,
        skin_id: usize,
        wallet_id: impl Into<String>,
    ) -> Result<Self> {
        let theme = themes
            .get(theme_id)
            .ok_or(CatalogError::UnknownTheme(theme_id))?;
        if skin_id >= theme.skins.len() {
            return Err(CatalogError::UnknownSkin {
                theme: theme.header.name.clone(),
                skin_id,
            });
        }
        Ok(Self {
            themes,
            theme_id,
            skin_id,
            wallet_id: wallet_id.into(),
        })
    }

    /// Project `catalog` for `wallet_id`: the wallet's mapped skin, or the
    /// theme default when unmapped. A mapping that no longer indexes a skin
    /// of the current theme falls back to the default too; the catalog is
    /// left as it is.
    pub fn from_catalog(catalog: &Catalog, wallet_id: &str) -> Result<Self> {
        let theme = catalog
            .current_theme()
            .ok_or(CatalogError::UnknownTheme(catalog.theme_id))?;
        let default = theme.header.default_skin_id;
        let skin_id = match catalog.skin_for.get(wallet_id) {
            Some(&id) if id < theme.skins.len() => id,
            Some(&id) => {
                log::warn!(
                    "Skin {id} for wallet '{wallet_id}' is not in theme '{}'; using default skin {default}",
                    theme.header.name
                );
                default
            },
            None => default,
        };
        Self::new(catalog.themes.clone(), catalog.theme_id, skin_id, wallet_id)
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn theme_by_id(&self, theme_id: usize) -> Option<&Theme> {
        self.themes.get(theme_id)
    }

    pub fn theme_id(&self) -> usize {
        self.theme_id
    }

    pub fn theme(&self) -> &Theme {
        &self.themes[self.theme_id]
    }

    /// Skins of the published theme.
    pub fn skins(&self) -> &[Skin] {
        &self.theme().skins
    }

    pub fn skin_by_id(&self, skin_id: usize) -> Option<&Skin> {
        self.skins().get(skin_id)
    }

    pub fn skin_id(&self) -> usize {
        self.skin_id
    }

    pub fn skin(&self) -> &Skin {
        &self.skins()[self.skin_id]
    }

    pub fn theme_default_skin_id(&self) -> usize {
        self.theme().header.default_skin_id
    }

    /// Wallet the snapshot was built for; empty before any wallet is active.
    pub fn wallet_id(&self) -> &str {
        &self.wallet_id
    }

    /// Toast colours from the published skin and theme.
    pub fn toast_style(&self) -> ToastStyle {
        let theme = &self.theme().view;
        ToastStyle {
            color: self.skin().view.text_highlight_color().map(str::to_string),
            icon_color: theme.notification_bar_icon_color().map(str::to_string),
            bar_background: theme.notification_bar_background().map(str::to_string),
        }
    }
}
