//! Minimal HTTP/1.1 GET client for JSON endpoints.
//!
//! Plain HTTP over `std::net::TcpStream`; HTTPS when the `tls-rustls`
//! feature is enabled. Follows redirects, decodes chunked bodies, and caps
//! the body size. Every failure is reported as a
//! [`CatalogError::Transport`] carrying the URL that failed.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use themecat_types::error::{CatalogError, Result};

use crate::url::Url;

/// Maximum response body size (8 MB).
const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: u8 = 5;

/// Connect and read timeouts applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            read: Duration::from_secs(15),
        }
    }
}

/// A raw parsed HTTP response.
#[derive(Debug)]
pub struct HttpResponse {
    pub status_code: u16,
    /// Header names are lower-cased.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Blocking HTTP GET client.
#[derive(Clone, Default)]
pub struct HttpClient {
    timeouts: Timeouts,
    #[cfg(feature = "tls-rustls")]
    tls: Option<crate::tls::RustlsConnector>,
}

impl HttpClient {
    /// A client without TLS support; `https` URLs fail with a transport
    /// error.
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            timeouts,
            #[cfg(feature = "tls-rustls")]
            tls: None,
        }
    }

    /// A client that speaks HTTPS through rustls with the Mozilla root set.
    #[cfg(feature = "tls-rustls")]
    pub fn with_tls(timeouts: Timeouts) -> Self {
        Self {
            timeouts,
            tls: Some(crate::tls::RustlsConnector::new()),
        }
    }

    /// GET `url`, following up to [`MAX_REDIRECTS`] redirects.
    pub fn get(&self, url: &Url) -> Result<HttpResponse> {
        if url.scheme != "http" && url.scheme != "https" {
            return Err(CatalogError::transport(
                url.to_string(),
                format!("unsupported scheme: {}", url.scheme),
            ));
        }

        let mut current = url.clone();
        for _ in 0..MAX_REDIRECTS {
            log::debug!("GET {current}");
            let resp = self.do_request(&current)?;

            if is_redirect(resp.status_code)
                && let Some(location) = resp.header("location")
            {
                current = current.join(location).ok_or_else(|| {
                    CatalogError::transport(
                        current.to_string(),
                        format!("bad redirect Location: {location}"),
                    )
                })?;
                continue;
            }
            return Ok(resp);
        }

        Err(CatalogError::transport(url.to_string(), "too many redirects"))
    }

    fn do_request(&self, url: &Url) -> Result<HttpResponse> {
        let fail = |msg: String| CatalogError::transport(url.to_string(), msg);
        let stream = tcp_connect(&url.host, url.effective_port(), self.timeouts).map_err(fail)?;

        let raw = if url.scheme == "https" {
            self.https_exchange(url, stream)?
        } else {
            let mut stream = stream;
            send_request(&mut stream, url).map_err(fail)?;
            read_response(&mut stream).map_err(fail)?
        };
        parse_response(&raw).map_err(fail)
    }

    #[cfg(feature = "tls-rustls")]
    fn https_exchange(&self, url: &Url, stream: TcpStream) -> Result<Vec<u8>> {
        let fail = |msg: String| CatalogError::transport(url.to_string(), msg);
        let connector = self
            .tls
            .as_ref()
            .ok_or_else(|| fail("TLS not enabled on this client".to_string()))?;
        let mut tls = connector.connect(&url.host, stream).map_err(fail)?;
        send_request(&mut tls, url).map_err(fail)?;
        read_response(&mut tls).map_err(fail)
    }

    #[cfg(not(feature = "tls-rustls"))]
    fn https_exchange(&self, url: &Url, _stream: TcpStream) -> Result<Vec<u8>> {
        Err(CatalogError::transport(
            url.to_string(),
            "HTTPS requires the tls-rustls feature",
        ))
    }
}

/// Open a TCP connection with connect and read timeouts.
fn tcp_connect(host: &str, port: u16, timeouts: Timeouts) -> std::result::Result<TcpStream, String> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| format!("DNS resolution failed: {e}"))?
        .next()
        .ok_or_else(|| format!("no addresses for {host}:{port}"))?;

    let stream = TcpStream::connect_timeout(&addr, timeouts.connect)
        .map_err(|e| format!("TCP connect failed: {e}"))?;
    stream
        .set_read_timeout(Some(timeouts.read))
        .map_err(|e| format!("set read timeout: {e}"))?;
    Ok(stream)
}

/// Send a GET with JSON accept/content-type headers.
fn send_request(stream: &mut impl Write, url: &Url) -> std::result::Result<(), String> {
    let default_port = if url.scheme == "https" { 443 } else { 80 };
    let host_header = match url.port {
        Some(p) if p != default_port => format!("{}:{p}", url.host),
        _ => url.host.clone(),
    };
    let target = url.request_target();

    let request = format!(
        "GET {target} HTTP/1.1\r\n\
         Host: {host_header}\r\n\
         User-Agent: themecat/{}\r\n\
         Accept: application/json\r\n\
         Content-Type: application/json\r\n\
         Connection: close\r\n\
         \r\n",
        env!("CARGO_PKG_VERSION"),
    );
    stream
        .write_all(request.as_bytes())
        .and_then(|()| stream.flush())
        .map_err(|e| format!("send request: {e}"))
}

/// Read until EOF. A read timeout is an error: a partial JSON body is never
/// useful.
fn read_response(stream: &mut impl Read) -> std::result::Result<Vec<u8>, String> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if buf.len() + n > MAX_BODY_SIZE + 4096 {
                    return Err("response too large".to_string());
                }
                buf.extend_from_slice(&chunk[..n]);
            },
            // rustls reports a peer that closes without close_notify this way.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                return Err("read timed out".to_string());
            },
            Err(e) => return Err(format!("read response: {e}")),
        }
    }
    Ok(buf)
}

/// Parse raw bytes into status code, headers, and body.
pub fn parse_response(data: &[u8]) -> std::result::Result<HttpResponse, String> {
    let header_end = find_subsequence(data, b"\r\n\r\n")
        .ok_or_else(|| "malformed HTTP response: no header terminator".to_string())?;
    let header_str =
        std::str::from_utf8(&data[..header_end]).map_err(|_| "non-UTF-8 headers".to_string())?;

    let mut lines = header_str.split("\r\n");
    let status_line = lines.next().ok_or_else(|| "empty response".to_string())?;
    let status_code = parse_status_line(status_line)?;

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_lowercase(), value.trim().to_string()))
        .collect();

    let raw_body = &data[header_end + 4..];
    let body = if find_header(&headers, "transfer-encoding").is_some_and(|v| v.contains("chunked")) {
        decode_chunked(raw_body)?
    } else if let Some(cl) = find_header(&headers, "content-length") {
        let len: usize = cl.parse().map_err(|_| "bad Content-Length".to_string())?;
        if len > MAX_BODY_SIZE {
            return Err("response body exceeds 8 MB limit".to_string());
        }
        raw_body[..raw_body.len().min(len)].to_vec()
    } else {
        raw_body.to_vec()
    };

    if body.len() > MAX_BODY_SIZE {
        return Err("response body exceeds 8 MB limit".to_string());
    }

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

/// "HTTP/1.x NNN reason" -> NNN.
fn parse_status_line(line: &str) -> std::result::Result<u16, String> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    if !version.starts_with("HTTP/") {
        return Err(format!("bad status line: {line}"));
    }
    parts
        .next()
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| format!("bad status code in: {line}"))
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let name = name.to_lowercase();
    headers
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.as_str())
}

fn decode_chunked(data: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut result = Vec::new();
    let mut pos = 0;

    while let Some(i) = find_subsequence(&data[pos..], b"\r\n") {
        let line_end = pos + i;
        let size_line = std::str::from_utf8(&data[pos..line_end])
            .map_err(|_| "bad chunk size".to_string())?;
        // Chunk extensions follow a `;`.
        let size_str = size_line.split(';').next().unwrap_or("").trim();
        let chunk_size =
            usize::from_str_radix(size_str, 16).map_err(|_| "bad chunk size".to_string())?;
        if chunk_size == 0 {
            break;
        }

        let chunk_start = line_end + 2;
        let chunk_end = chunk_start + chunk_size;
        if chunk_end > data.len() {
            return Err("truncated chunked body".to_string());
        }
        if result.len() + chunk_size > MAX_BODY_SIZE {
            return Err("chunked body exceeds 8 MB limit".to_string());
        }
        result.extend_from_slice(&data[chunk_start..chunk_end]);
        pos = chunk_end + 2;
        if pos > data.len() {
            break;
        }
    }

    Ok(result)
}

fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
