//! Remote transport seam.
//!
//! The catalog service talks to the theme server through
//! [`RemoteTransport`] so tests and embedders can swap the wire. The
//! built-in [`HttpTransport`] sits on top of [`HttpClient`].

use serde_json::Value;

use themecat_types::error::{CatalogError, Result};

use crate::http::{HttpClient, Timeouts};
use crate::url::Url;

/// Fetches JSON documents by absolute URL.
pub trait RemoteTransport: Send + Sync {
    /// GET `url` and parse the body as JSON. Errors carry the failed URL.
    fn get_json(&self, url: &str) -> Result<Value>;
}

/// [`RemoteTransport`] over the built-in HTTP/1.1 client.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Plain-HTTP transport with the given timeouts (HTTPS too when built
    /// with `tls-rustls`).
    pub fn with_timeouts(timeouts: Timeouts) -> Self {
        #[cfg(feature = "tls-rustls")]
        let client = HttpClient::with_tls(timeouts);
        #[cfg(not(feature = "tls-rustls"))]
        let client = HttpClient::new(timeouts);
        Self { client }
    }
}

impl RemoteTransport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<Value> {
        let parsed =
            Url::parse(url).ok_or_else(|| CatalogError::transport(url, "invalid URL"))?;
        let resp = self.client.get(&parsed)?;
        if !resp.is_success() {
            return Err(CatalogError::transport(
                url,
                format!("HTTP status {}", resp.status_code),
            ));
        }
        serde_json::from_slice(&resp.body)
            .map_err(|e| CatalogError::transport(url, format!("invalid JSON body: {e}")))
    }
}
