//! Error types for themecat.

use std::io;

/// Errors produced while loading, persisting, or syncing the theme catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A theme or skin document could not be fetched, parsed, or resolved.
    #[error("load error: {0}")]
    Load(String),

    /// The catalog store failed to read or write.
    #[error("store error: {0}")]
    Store(String),

    /// A request to a remote or local URL failed.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("VFS error: {0}")]
    Vfs(String),

    #[error("no theme with id {0} in the catalog")]
    UnknownTheme(usize),

    #[error("no theme named '{0}' in the catalog")]
    UnknownThemeName(String),

    #[error("no skin with id {skin_id} in theme '{theme}'")]
    UnknownSkin { theme: String, skin_id: usize },

    /// Import was asked for an index outside the last discovery snapshot.
    #[error("no discovered entry at index {0}")]
    NotDiscovered(usize),

    #[error("nothing has been published yet")]
    NotPublished,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    /// Build a [`CatalogError::Transport`] for `url`.
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_display() {
        let e = CatalogError::Load("theme.json: missing header".into());
        assert_eq!(format!("{e}"), "load error: theme.json: missing header");
    }

    #[test]
    fn store_error_display() {
        let e = CatalogError::Store("disk full".into());
        assert_eq!(format!("{e}"), "store error: disk full");
    }

    #[test]
    fn transport_error_carries_url() {
        let e = CatalogError::transport("http://themes.local/themes", "connection refused");
        let msg = format!("{e}");
        assert!(msg.contains("http://themes.local/themes"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn unknown_skin_display() {
        let e = CatalogError::UnknownSkin {
            theme: "default".into(),
            skin_id: 7,
        };
        assert_eq!(format!("{e}"), "no skin with id 7 in theme 'default'");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: CatalogError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: CatalogError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: CatalogError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }
}
