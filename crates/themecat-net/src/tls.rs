//! HTTPS support backed by rustls + ring.
//!
//! Enabled by the `tls-rustls` feature. Sockets are blocking, so rustls'
//! own `StreamOwned` drives the handshake lazily on first I/O.

use std::net::TcpStream;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, StreamOwned};

/// Shared, reusable TLS client configuration trusting Mozilla's roots.
#[derive(Clone)]
pub struct RustlsConnector {
    config: Arc<ClientConfig>,
}

impl RustlsConnector {
    pub fn new() -> Self {
        let root_store =
            rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();
        Self {
            config: Arc::new(config),
        }
    }

    /// Wrap `stream` in a TLS session for `host` (used for SNI and
    /// certificate verification).
    pub fn connect(
        &self,
        host: &str,
        stream: TcpStream,
    ) -> Result<StreamOwned<ClientConnection, TcpStream>, String> {
        let sni = ServerName::try_from(host.to_owned())
            .map_err(|e| format!("invalid server name: {e}"))?;
        let conn = ClientConnection::new(Arc::clone(&self.config), sni)
            .map_err(|e| format!("TLS init: {e}"))?;
        Ok(StreamOwned::new(conn, stream))
    }
}

impl Default for RustlsConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_is_constructible() {
        let connector = RustlsConnector::new();
        let _clone = connector.clone();
    }

    #[test]
    fn invalid_server_name_rejected() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let stream = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let err = RustlsConnector::new()
            .connect("not a hostname!", stream)
            .err()
            .unwrap();
        assert!(err.contains("invalid server name"));
    }
}
