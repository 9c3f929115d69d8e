//! URL parsing and `encodeURI`-style percent-encoding.

use std::fmt;

/// Characters `encode_uri` leaves untouched besides ASCII alphanumerics:
/// the unreserved marks plus the reserved URI delimiters.
const URI_SAFE: &[u8] = b";,/?:@&=+$-_.!~*'()#";

/// Percent-encode `input` the way `encodeURI` does: URI delimiters and
/// unreserved characters pass through, everything else (spaces, non-ASCII,
/// `%`, brackets) becomes `%XX` per UTF-8 byte.
pub fn encode_uri(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        if b.is_ascii_alphanumeric() || URI_SAFE.contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// A parsed absolute URL (`scheme://host[:port]/path[?query]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    /// Path component starting with `/`.
    pub path: String,
    /// Query string without the leading `?`.
    pub query: Option<String>,
}

impl Url {
    /// Parse an absolute URL. Fragments are dropped; they never reach the
    /// server.
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        let idx = url.find("://")?;
        let scheme = url[..idx].to_ascii_lowercase();
        if scheme.is_empty() {
            return None;
        }
        let rest = &url[idx + 3..];
        let rest = rest.split('#').next().unwrap_or("");

        let (rest, query) = match rest.split_once('?') {
            Some((r, q)) => (r, Some(q.to_string())),
            None => (rest, None),
        };
        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        let (host, port) = match authority.rsplit_once(':') {
            Some((h, p)) => (h, Some(p.parse::<u16>().ok()?)),
            None => (authority, None),
        };

        Some(Url {
            scheme,
            host: host.to_string(),
            port,
            path: path.to_string(),
            query,
        })
    }

    /// Port to connect to: the explicit one, or the scheme default.
    pub fn effective_port(&self) -> u16 {
        self.port
            .unwrap_or(if self.scheme == "https" { 443 } else { 80 })
    }

    /// Path plus query, as sent on the request line.
    pub fn request_target(&self) -> String {
        match self.query {
            Some(ref q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// Resolve a redirect `Location` against this URL. Handles absolute URLs
    /// and absolute paths.
    pub fn join(&self, location: &str) -> Option<Url> {
        if location.contains("://") {
            return Url::parse(location);
        }
        if !location.starts_with('/') {
            return None;
        }
        let (path, query) = match location.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (location.to_string(), None),
        };
        Some(Url {
            path,
            query,
            ..self.clone()
        })
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        write!(f, "{}", self.request_target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_spaces_and_keeps_delimiters() {
        assert_eq!(
            encode_uri("file:///opt/my wallet/themes/Night Owl"),
            "file:///opt/my%20wallet/themes/Night%20Owl"
        );
        assert_eq!(
            encode_uri("http://h:8080/a?b=c&d=e#f"),
            "http://h:8080/a?b=c&d=e#f"
        );
    }

    #[test]
    fn encode_non_ascii_as_utf8_bytes() {
        assert_eq!(encode_uri("/themes/caf\u{e9}"), "/themes/caf%C3%A9");
        assert_eq!(encode_uri("100%"), "100%25");
    }

    #[test]
    fn parse_full_url() {
        let u = Url::parse("http://themes.example.com:8080/api/themes?x=1#top").unwrap();
        assert_eq!(u.scheme, "http");
        assert_eq!(u.host, "themes.example.com");
        assert_eq!(u.port, Some(8080));
        assert_eq!(u.path, "/api/themes");
        assert_eq!(u.query.as_deref(), Some("x=1"));
        assert_eq!(u.to_string(), "http://themes.example.com:8080/api/themes?x=1");
    }

    #[test]
    fn parse_host_only() {
        let u = Url::parse("https://themes.example.com").unwrap();
        assert_eq!(u.path, "/");
        assert_eq!(u.effective_port(), 443);
    }

    #[test]
    fn parse_rejects_relative_and_bad_port() {
        assert!(Url::parse("/themes").is_none());
        assert!(Url::parse("http://host:notaport/").is_none());
    }

    #[test]
    fn join_absolute_path_keeps_authority() {
        let base = Url::parse("http://127.0.0.1:9000/themes").unwrap();
        let next = base.join("/v2/themes?page=2").unwrap();
        assert_eq!(next.to_string(), "http://127.0.0.1:9000/v2/themes?page=2");
    }

    #[test]
    fn join_absolute_url_replaces_everything() {
        let base = Url::parse("http://a/x").unwrap();
        let next = base.join("https://b/y").unwrap();
        assert_eq!(next.host, "b");
        assert_eq!(next.scheme, "https");
    }

    #[test]
    fn join_relative_path_unsupported() {
        let base = Url::parse("http://a/x").unwrap();
        assert!(base.join("y").is_none());
    }

    proptest! {
        #[test]
        fn encoded_output_is_ascii_without_spaces(s in "\\PC*") {
            let out = encode_uri(&s);
            prop_assert!(out.is_ascii());
            prop_assert!(!out.contains(' '));
        }

        #[test]
        fn safe_input_is_unchanged(s in "[A-Za-z0-9/:._~-]*") {
            prop_assert_eq!(encode_uri(&s), s);
        }
    }
}
