//! Built-in theme bootstrap.
//!
//! Loads one theme document and every declared skin from the local resource
//! bundle, resolves their placeholders, and assembles a complete [`Theme`].
//! Skins are loaded on scoped worker threads, one slot per declared name,
//! so the result is in declaration order whatever order the loads finish.

use std::thread;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use themecat_types::error::{CatalogError, Result};

use crate::bundle::ResourceBundle;
use crate::model::{Skin, Theme};
use crate::resolve::{
    PathTokens, PlaceholderPolicy, SKIN_DOCUMENT, THEME_DOCUMENT, resolve_document,
    skin_resource_path, theme_resource_path,
};

/// Which built-in theme to load and which of its skins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapDefinition {
    pub theme: String,
    #[serde(default)]
    pub skins: Vec<String>,
}

impl Default for BootstrapDefinition {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            skins: Vec::new(),
        }
    }
}

/// Load and resolve the theme named by `definition` together with its
/// skins. Fails with the first load error if the theme or any skin fails;
/// every skin failure is logged.
pub fn bootstrap_theme(
    bundle: &dyn ResourceBundle,
    definition: &BootstrapDefinition,
    policy: PlaceholderPolicy,
) -> Result<Theme> {
    let theme_name = definition.theme.as_str();
    let path = format!("{}/{THEME_DOCUMENT}", theme_resource_path(theme_name));
    log::debug!("Bootstrapping theme '{theme_name}' from {path}");

    let raw = bundle.load(&path)?;
    let tokens = PathTokens::for_theme(bundle.base_url(), theme_name);
    let mut resolved = resolve_document(raw, &tokens, policy, &path)?;
    let default_skin_name = take_default_skin_name(&mut resolved, &path)?;
    let mut theme: Theme = serde_json::from_value(resolved)
        .map_err(|e| CatalogError::Load(format!("{path}: {e}")))?;

    let results: Vec<Result<Skin>> = thread::scope(|scope| {
        let slots: Vec<_> = definition
            .skins
            .iter()
            .map(|skin_name| {
                scope.spawn(move || load_skin(bundle, theme_name, skin_name, policy))
            })
            .collect();
        slots
            .into_iter()
            .zip(&definition.skins)
            .map(|(handle, skin_name)| {
                handle.join().unwrap_or_else(|_| {
                    Err(CatalogError::Load(format!(
                        "skin '{skin_name}': loader thread panicked"
                    )))
                })
            })
            .collect()
    });

    let mut skins = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(skin) => skins.push(skin),
            Err(e) => {
                log::error!("Theme '{theme_name}': {e}");
                first_error.get_or_insert(e);
            },
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }

    theme.skins = skins;
    if let Some(name) = default_skin_name {
        theme.header.default_skin_id = theme.skin_index(&name);
    }
    if theme.default_skin().is_none() {
        return Err(CatalogError::Load(format!(
            "{path}: default skin {} is not among the {} loaded skins",
            theme.header.default_skin_id,
            theme.skins.len()
        )));
    }

    log::info!(
        "Bootstrapped theme '{}' with {} skins (default '{}')",
        theme.header.name,
        theme.skins.len(),
        theme.skins[theme.header.default_skin_id].header.name
    );
    Ok(theme)
}

fn load_skin(
    bundle: &dyn ResourceBundle,
    theme_name: &str,
    skin_name: &str,
    policy: PlaceholderPolicy,
) -> Result<Skin> {
    let path = format!(
        "{}/{SKIN_DOCUMENT}",
        skin_resource_path(theme_name, skin_name)
    );
    let raw = bundle.load(&path)?;
    let tokens = PathTokens::for_skin(bundle.base_url(), theme_name, skin_name);
    let resolved = resolve_document(raw, &tokens, policy, &path)?;
    let skin = serde_json::from_value(resolved)
        .map_err(|e| CatalogError::Load(format!("{path}: {e}")))?;
    log::debug!("Loaded skin {path}");
    Ok(skin)
}

/// Remove `header.defaultSkinName` from a resolved theme document.
fn take_default_skin_name(doc: &mut Value, path: &str) -> Result<Option<String>> {
    let Some(header) = doc.get_mut("header").and_then(Value::as_object_mut) else {
        return Ok(None);
    };
    match header.remove("defaultSkinName") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => Ok(Some(name)),
        Some(other) => Err(CatalogError::Load(format!(
            "{path}: defaultSkinName is not a string: {other}"
        ))),
    }
}
