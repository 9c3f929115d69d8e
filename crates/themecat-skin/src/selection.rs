//! Theme and per-wallet skin selection.

use std::collections::BTreeMap;
use std::sync::Arc;

use themecat_types::error::{CatalogError, Result};

use crate::events::{CatalogEvent, Toast};
use crate::model::{CatalogPatch, SkinHeader, Theme, ThemeHeader};
use crate::publish::PublishedState;
use crate::service::ThemeService;

/// Skin mapping after switching to `theme`: every wallet moves to the
/// theme's default skin. Skin ids are positional per theme, so a mapping
/// from the old theme means nothing in the new one.
pub fn remap_skins_for_theme(
    skin_for: &BTreeMap<String, usize>,
    theme: &Theme,
) -> BTreeMap<String, usize> {
    let default = theme.header.default_skin_id;
    skin_for
        .keys()
        .map(|wallet| (wallet.clone(), default))
        .collect()
}

impl ThemeService {
    /// Skin id for `wallet_id` in the catalog's current theme: its mapping
    /// if it indexes a skin of that theme, else the theme default. `None`
    /// only when the catalog has no current theme.
    pub fn resolve_skin_for_wallet(&self, wallet_id: &str) -> Option<usize> {
        let catalog = self.store.get_sync();
        let theme = catalog.current_theme()?;
        match catalog.skin_for.get(wallet_id) {
            Some(&skin_id) if skin_id < theme.skins.len() => Some(skin_id),
            _ => Some(theme.header.default_skin_id),
        }
    }

    /// Switch the catalog to theme `theme_id` and move every wallet to the
    /// new theme's default skin.
    ///
    /// The theme id and the skin mapping are two separate writes. If the
    /// second fails the first stays committed.
    pub fn set_theme(&mut self, theme_id: usize) -> Result<Arc<PublishedState>> {
        let catalog = self.store.get_sync();
        let theme = catalog
            .themes
            .get(theme_id)
            .ok_or(CatalogError::UnknownTheme(theme_id))?;
        if theme.default_skin().is_none() {
            return Err(CatalogError::UnknownSkin {
                theme: theme.header.name.clone(),
                skin_id: theme.header.default_skin_id,
            });
        }
        log::debug!(
            "Switching theme {} -> {theme_id} ('{}')",
            catalog.theme_id,
            theme.header.name
        );
        let skin_for = remap_skins_for_theme(&catalog.skin_for, theme);

        self.write(CatalogPatch::theme_id(theme_id))?;
        self.write(CatalogPatch::skin_for(skin_for))?;

        let state = self.publish()?;
        self.events.emit(CatalogEvent::ThemeUpdated);
        self.events.emit(CatalogEvent::SkinUpdated);
        self.events.success(Toast::success(
            format!("Theme set to '{}'", state.theme().header.name),
            state.toast_style(),
        ));
        Ok(state)
    }

    /// Make `wallet_id` the active wallet and map it to `skin_id` of the
    /// current theme. Other wallets' mappings are kept.
    pub fn set_skin_for_wallet(
        &mut self,
        skin_id: usize,
        wallet_id: &str,
    ) -> Result<Arc<PublishedState>> {
        let catalog = self.store.get_sync();
        let theme = catalog
            .current_theme()
            .ok_or(CatalogError::UnknownTheme(catalog.theme_id))?;
        let Some(skin) = theme.skins.get(skin_id) else {
            return Err(CatalogError::UnknownSkin {
                theme: theme.header.name.clone(),
                skin_id,
            });
        };
        if self.published.as_ref().map(|p| p.skin_id()) == Some(skin_id) {
            log::debug!("Reapplying skin '{}' [walletId: {wallet_id}]", skin.header.name);
        } else {
            log::debug!("Switching skin to '{}' [walletId: {wallet_id}]", skin.header.name);
        }
        let mut skin_for = catalog.skin_for.clone();
        skin_for.insert(wallet_id.to_string(), skin_id);

        self.wallet_id = wallet_id.to_string();
        self.write(CatalogPatch::skin_for(skin_for))?;

        let state = self.publish()?;
        self.events.emit(CatalogEvent::SkinUpdated);
        Ok(state)
    }

    /// Apply the skin for a newly active wallet: its existing mapping, or
    /// the published theme's default when it has none. Always writes and
    /// republishes, even when nothing changed.
    ///
    /// A mapping that no longer indexes a skin of the current theme is
    /// replaced by the default.
    pub fn update_skin(&mut self, wallet_id: &str) -> Result<Arc<PublishedState>> {
        self.wallet_id = wallet_id.to_string();
        let catalog = self.store.get_sync();
        let default = match &self.published {
            Some(state) => state.theme_default_skin_id(),
            None => catalog
                .current_theme()
                .map(|t| t.header.default_skin_id)
                .ok_or(CatalogError::UnknownTheme(catalog.theme_id))?,
        };
        let skin_count = catalog.current_theme().map_or(0, |t| t.skins.len());
        let skin_id = match catalog.skin_for.get(wallet_id) {
            Some(&id) if id < skin_count => id,
            Some(&id) => {
                log::warn!("Wallet '{wallet_id}' mapped to missing skin {id}; using default {default}");
                default
            },
            None => default,
        };
        self.set_skin_for_wallet(skin_id, wallet_id)
    }

    /// Exact match against the catalog's theme schema version.
    pub fn is_theme_compatible(&self, header: &ThemeHeader) -> bool {
        header.schema_version == self.store.get_sync().metadata.theme_schema_version
    }

    /// Exact match against the catalog's skin schema version.
    pub fn is_skin_compatible(&self, header: &SkinHeader) -> bool {
        header.schema_version == self.store.get_sync().metadata.skin_schema_version
    }
}
