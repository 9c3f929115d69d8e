//! Service configuration, loaded from `themecat.toml`.
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use themecat_net::Timeouts;
use themecat_types::error::{CatalogError, Result};

use crate::bootstrap::BootstrapDefinition;
use crate::model::{Catalog, CatalogMetadata, ServiceEndpoint};
use crate::resolve::PlaceholderPolicy;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ThemeConfig {
    #[serde(default)]
    pub resources: ResourcesConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub bootstrap: BootstrapDefinition,
    #[serde(default)]
    pub placeholders: PlaceholderConfig,
}

/// The local resource bundle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourcesConfig {
    /// Host directory served as the bundle root.
    #[serde(default = "default_resources_root")]
    pub root: String,
    /// URL substituted for the bundle root in `<theme-path>`/`<skin-path>`.
    #[serde(default = "default_resources_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogConfig {
    /// Host directory holding the persisted catalog.
    #[serde(default = "default_catalog_root")]
    pub root: String,
    /// VFS path of the catalog file under `root`.
    #[serde(default = "default_catalog_file")]
    pub file: String,
    #[serde(default = "default_schema_version")]
    pub theme_schema_version: u32,
    #[serde(default = "default_schema_version")]
    pub skin_schema_version: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaceholderConfig {
    /// Fail loads that leave placeholder tokens unresolved.
    #[serde(default)]
    pub strict: bool,
}

fn default_resources_root() -> String {
    ".".to_string()
}

fn default_resources_base_url() -> String {
    "file://.".to_string()
}

fn default_catalog_root() -> String {
    ".".to_string()
}

fn default_catalog_file() -> String {
    "/theme-catalog.json".to_string()
}

fn default_schema_version() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    15
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            root: default_resources_root(),
            base_url: default_resources_base_url(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: default_catalog_root(),
            file: default_catalog_file(),
            theme_schema_version: default_schema_version(),
            skin_schema_version: default_schema_version(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

impl ThemeConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| CatalogError::Config(format!("themecat.toml: {e}")))
    }

    /// Read the configuration at `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn placeholder_policy(&self) -> PlaceholderPolicy {
        if self.placeholders.strict {
            PlaceholderPolicy::Strict
        } else {
            PlaceholderPolicy::Verbatim
        }
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.service.connect_timeout_secs),
            read: Duration::from_secs(self.service.read_timeout_secs),
        }
    }

    /// The catalog a fresh store starts from: no themes, configured service
    /// and schema versions.
    pub fn default_catalog(&self) -> Catalog {
        Catalog {
            service: ServiceEndpoint {
                url: self.service.url.clone(),
            },
            metadata: CatalogMetadata {
                theme_schema_version: self.catalog.theme_schema_version,
                skin_schema_version: self.catalog.skin_schema_version,
            },
            ..Catalog::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = ThemeConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ThemeConfig::default());
        assert_eq!(cfg.catalog.file, "/theme-catalog.json");
        assert_eq!(cfg.timeouts().connect, Duration::from_secs(10));
        assert_eq!(cfg.timeouts().read, Duration::from_secs(15));
        assert_eq!(cfg.placeholder_policy(), PlaceholderPolicy::Verbatim);
        assert_eq!(cfg.bootstrap.theme, "default");
    }

    #[test]
    fn full_file() {
        let cfg = ThemeConfig::from_toml_str(
            r#"
            [resources]
            root = "/usr/share/wallet"
            base_url = "file:///usr/share/wallet"

            [catalog]
            root = "/var/lib/wallet"
            theme_schema_version = 2

            [service]
            url = "https://themes.example.com/api"
            read_timeout_secs = 30

            [bootstrap]
            theme = "default"
            skins = ["light", "dark"]

            [placeholders]
            strict = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.resources.base_url, "file:///usr/share/wallet");
        assert_eq!(cfg.bootstrap.skins, ["light", "dark"]);
        assert_eq!(cfg.placeholder_policy(), PlaceholderPolicy::Strict);
        assert_eq!(cfg.timeouts().read, Duration::from_secs(30));

        let catalog = cfg.default_catalog();
        assert!(catalog.themes.is_empty());
        assert_eq!(catalog.service.url, "https://themes.example.com/api");
        assert_eq!(catalog.metadata.theme_schema_version, 2);
        assert_eq!(catalog.metadata.skin_schema_version, 1);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = ThemeConfig::from_toml_str("[service\nurl = 1").unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn missing_file_is_defaults_and_present_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("themecat.toml");
        assert_eq!(ThemeConfig::load(&path).unwrap(), ThemeConfig::default());

        std::fs::write(&path, "[service]\nurl = \"http://localhost:8080\"\n").unwrap();
        assert_eq!(ThemeConfig::load(&path).unwrap().service.url, "http://localhost:8080");
    }
}
