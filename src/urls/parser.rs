//! URL Parser
//!
//! Splits an absolute base address into the parts the resource hierarchy
//! derives its endpoints from.

use crate::error::{RdsError, Result};
use std::collections::HashMap;
use url::Url;

/// An absolute URL split into its parts
///
/// ```
/// use rds_sdk::urls::parse_url;
///
/// let url = parse_url("http://abc.com:8080/dir/index.html?id=255&m=hello#top").unwrap();
/// assert_eq!(url.protocol, "http");
/// assert_eq!(url.host, "abc.com");
/// assert_eq!(url.port, Some(8080));
/// assert_eq!(url.path, "/dir/index.html");
/// assert_eq!(url.segments, vec!["dir", "index.html"]);
/// assert_eq!(url.query, "id=255&m=hello");
/// assert_eq!(url.params["m"], "hello");
/// assert_eq!(url.fragment, "top");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// The string that was parsed, untouched
    pub source: String,
    /// Scheme without the trailing `:`
    pub protocol: String,
    /// Subdomain (if any) and domain
    pub host: String,
    /// Explicit, non-default port
    pub port: Option<u16>,
    /// Always begins with `/`
    pub path: String,
    /// The path split on `/`, leading slash excluded
    pub segments: Vec<String>,
    /// Raw query string without the leading `?`
    pub query: String,
    /// Query parameters; values are kept percent-encoded
    pub params: HashMap<String, String>,
    /// Fragment without the leading `#`
    pub fragment: String,
}

impl ParsedUrl {
    /// `protocol://host[:port]path` with trailing slashes removed
    pub fn base_url(&self) -> String {
        let port = self.port.map(|p| format!(":{}", p)).unwrap_or_default();
        let base = format!("{}://{}{}{}", self.protocol, self.host, port, self.path);
        strip_trailing_slashes(&base).to_string()
    }
}

/// Parse an absolute URL
///
/// Fails with [`RdsError::MalformedUrl`] when the input is not an absolute
/// URL with a host. Never touches the network.
pub fn parse_url(input: &str) -> Result<ParsedUrl> {
    let url = Url::parse(input).map_err(|e| RdsError::malformed_url(input, e))?;

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return Err(RdsError::malformed_url(input, "missing host")),
    };

    let path = if url.path().starts_with('/') {
        url.path().to_string()
    } else {
        format!("/{}", url.path())
    };

    let segments = path[1..].split('/').map(String::from).collect();
    let query = url.query().unwrap_or_default().to_string();
    let params = parse_query(&query);

    Ok(ParsedUrl {
        source: input.to_string(),
        protocol: url.scheme().to_string(),
        host,
        port: url.port(),
        path,
        segments,
        params,
        query,
        fragment: url.fragment().unwrap_or_default().to_string(),
    })
}

/// Split a raw query string into a name -> value map
///
/// Segments are split on `&` then on the first `=`. Empty segments are
/// skipped, a name without `=` maps to an empty value, and a repeated name
/// keeps its last value.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((name, value)) => (name.to_string(), value.to_string()),
            None => (segment.to_string(), String::new()),
        })
        .collect()
}

/// Remove every trailing `/`
pub fn strip_trailing_slashes(url: &str) -> &str {
    url.trim_end_matches('/')
}
