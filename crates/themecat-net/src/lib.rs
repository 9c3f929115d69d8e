//! Networking for themecat: URL handling, a minimal HTTP/1.1 JSON client,
//! and the [`RemoteTransport`] seam the catalog service fetches through.

pub mod http;
#[cfg(feature = "tls-rustls")]
pub mod tls;
mod transport;
pub mod url;

pub use http::{HttpClient, HttpResponse, Timeouts};
#[cfg(feature = "tls-rustls")]
pub use tls::RustlsConnector;
pub use transport::{HttpTransport, RemoteTransport};
pub use url::{Url, encode_uri};
