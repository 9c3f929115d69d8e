//! Remote theme/skin discovery and import.
//!
//! Fetch failures are not errors here: a failed discovery returns an empty
//! list and keeps the previous snapshot, a failed import returns `None`, and
//! neither touches the catalog. Store failures still propagate.

use serde::de::DeserializeOwned;

use themecat_types::error::{CatalogError, Result};

use crate::events::Toast;
use crate::model::{CatalogPatch, HeaderListing, Skin, SkinHeader, Theme, ThemeHeader};
use crate::resolve::{absolute_url, theme_resource_path};
use crate::service::ThemeService;

impl ThemeService {
    /// List the service's themes, keep the schema-compatible ones, and make
    /// them the discovered-themes snapshot.
    pub fn discover_themes(&mut self) -> Vec<ThemeHeader> {
        let url = self.service_url("/themes");
        let listing: HeaderListing<ThemeHeader> = match self.fetch(&url) {
            Ok(listing) => listing,
            Err(e) => {
                log::warn!("Theme discovery failed: {e}");
                return Vec::new();
            },
        };
        let headers: Vec<ThemeHeader> = listing
            .data
            .into_iter()
            .filter(|h| {
                let ok = self.is_theme_compatible(h);
                if !ok {
                    log::debug!(
                        "Skipping incompatible theme '{}' (schema {})",
                        h.name,
                        h.schema_version
                    );
                }
                ok
            })
            .collect();
        log::info!("Discovered {} themes", headers.len());
        self.discovered_themes = headers.clone();
        headers
    }

    /// Fetch discovered theme `index` and store it in the catalog, replacing
    /// a theme of the same name or appending.
    pub fn import_theme(&mut self, index: usize) -> Result<Option<Theme>> {
        let name = self
            .discovered_themes
            .get(index)
            .ok_or(CatalogError::NotDiscovered(index))?
            .name
            .clone();
        let url = self.service_url(&theme_resource_path(&name));
        let theme: Theme = match self.fetch(&url) {
            Ok(theme) => theme,
            Err(e) => {
                log::warn!("Theme import failed: {e}");
                return Ok(None);
            },
        };
        if theme.default_skin().is_none() {
            log::warn!(
                "Theme import failed: '{}' has no skin {} to default to",
                theme.header.name,
                theme.header.default_skin_id
            );
            return Ok(None);
        }

        let mut themes = self.store.get_sync().themes.clone();
        match themes.iter().position(|t| t.header.name == theme.header.name) {
            Some(i) => themes[i] = theme.clone(),
            None => themes.push(theme.clone()),
        }
        self.write(CatalogPatch::themes(themes))?;

        let state = self.publish()?;
        self.events.success(Toast::success(
            format!("Imported theme '{}'", theme.header.name),
            state.toast_style(),
        ));
        Ok(Some(theme))
    }

    /// List the service's skins for `theme_name`, keep the schema-compatible
    /// ones, and make them the discovered-skins snapshot.
    pub fn discover_skins(&mut self, theme_name: &str) -> Vec<SkinHeader> {
        let url = self.service_url(&format!("{}/skins", theme_resource_path(theme_name)));
        let listing: HeaderListing<SkinHeader> = match self.fetch(&url) {
            Ok(listing) => listing,
            Err(e) => {
                log::warn!("Skin discovery failed: {e}");
                return Vec::new();
            },
        };
        let headers: Vec<SkinHeader> = listing
            .data
            .into_iter()
            .filter(|h| {
                let ok = self.is_skin_compatible(h);
                if !ok {
                    log::debug!(
                        "Skipping incompatible skin '{}' (schema {})",
                        h.name,
                        h.schema_version
                    );
                }
                ok
            })
            .collect();
        log::info!("Discovered {} skins for theme '{theme_name}'", headers.len());
        self.discovered_skins = headers.clone();
        headers
    }

    /// Fetch discovered skin `index` into the published theme, replacing a
    /// skin of the same name or appending.
    pub fn import_skin(&mut self, index: usize) -> Result<Option<Skin>> {
        let skin_name = self
            .discovered_skins
            .get(index)
            .ok_or(CatalogError::NotDiscovered(index))?
            .name
            .clone();
        let theme_name = self
            .published
            .as_ref()
            .ok_or(CatalogError::NotPublished)?
            .theme()
            .header
            .name
            .clone();
        // The service serves skin documents directly under the theme.
        let url = self.service_url(&format!("{}/{skin_name}", theme_resource_path(&theme_name)));
        let skin: Skin = match self.fetch(&url) {
            Ok(skin) => skin,
            Err(e) => {
                log::warn!("Skin import failed: {e}");
                return Ok(None);
            },
        };

        let catalog = self.store.get_sync();
        let theme_index = catalog
            .theme_index(&theme_name)
            .ok_or_else(|| CatalogError::UnknownThemeName(theme_name.clone()))?;
        let mut themes = catalog.themes.clone();
        let target = &mut themes[theme_index];
        let skin_index = target.skin_index(&skin.header.name);
        if skin_index < target.skins.len() {
            target.skins[skin_index] = skin.clone();
        } else {
            target.skins.push(skin.clone());
        }
        if target.default_skin().is_none() {
            return Err(CatalogError::UnknownSkin {
                theme: theme_name,
                skin_id: target.header.default_skin_id,
            });
        }
        self.write(CatalogPatch::themes(themes))?;

        let state = self.publish()?;
        self.events.success(Toast::success(
            format!("Imported skin '{}'", skin.header.name),
            state.toast_style(),
        ));
        Ok(Some(skin))
    }

    fn service_url(&self, path: &str) -> String {
        absolute_url(&self.store.get_sync().service.url, path)
    }

    /// GET `url` and deserialize the body. A body of the wrong shape is a
    /// load error.
    fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.transport.get_json(url)?;
        serde_json::from_value(body)
            .map_err(|e| CatalogError::Load(format!("{url}: unexpected document: {e}")))
    }
}
