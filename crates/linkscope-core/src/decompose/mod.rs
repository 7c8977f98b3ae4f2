//! URL decomposition.
//!
//! Splits a raw URL string into scheme, host parts, path segments and query
//! parameters. Decomposition is a pure function of the input string;
//! [`Decomposer`] memoizes results (errors included) per input.

mod host;
mod query;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::memo::Memo;

pub use query::{decode_query, parse_query};

/// Why a raw string could not be decomposed. Both variants reject only the
/// one URL; callers report them per item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecomposeError {
    /// The string does not start with `http:` or `https:`.
    #[error("unsupported scheme in {url:?}")]
    UnsupportedScheme { url: String },
    /// The host has fewer than two labels (or an empty one).
    #[error("malformed host {host:?} in {url:?}")]
    MalformedHost { url: String, host: String },
}

/// The two accepted schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("https:") {
            Some(Scheme::Https)
        } else if token.eq_ignore_ascii_case("http:") {
            Some(Scheme::Http)
        } else {
            None
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw URL split into the parts site adapters match on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposedUrl {
    /// The input string, trimmed.
    pub raw: String,
    pub scheme: Scheme,
    /// Full lower-cased host without port or userinfo.
    pub hostname: String,
    /// Labels before the registrable domain, joined by `.`; empty if none.
    pub subdomain: String,
    /// Last two host labels, e.g. `example.com`.
    pub domain: String,
    pub tld: String,
    /// Percent-decoded path segments in order, empty segments dropped.
    pub path_segments: Vec<String>,
    /// Decoded query parameters; the last occurrence of a key wins.
    pub query: BTreeMap<String, String>,
}

impl DecomposedUrl {
    /// Path segment at `index`, if present.
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.path_segments.get(index).map(String::as_str)
    }

    /// Query parameter value for `key`, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// True when the URL has no subdomain or exactly `sub`.
    pub fn is_bare_or(&self, sub: &str) -> bool {
        self.subdomain.is_empty() || self.subdomain == sub
    }
}

/// Decomposes `raw` without caching.
pub fn decompose(raw: &str) -> Result<DecomposedUrl, DecomposeError> {
    let trimmed = raw.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or(trimmed);
    let (location, query) = match without_fragment.split_once('?') {
        Some((location, query)) => (location, query),
        None => (without_fragment, ""),
    };

    let mut parts = location.split('/');
    let scheme = parts
        .next()
        .and_then(Scheme::from_token)
        .ok_or_else(|| DecomposeError::UnsupportedScheme {
            url: trimmed.to_string(),
        })?;

    let mut parts = parts.filter(|p| !p.is_empty());
    let authority = parts.next().unwrap_or("");
    let host = host::split_host(authority).ok_or_else(|| DecomposeError::MalformedHost {
        url: trimmed.to_string(),
        host: authority.to_string(),
    })?;

    let path_segments = parts.map(decode_segment).collect();

    Ok(DecomposedUrl {
        raw: trimmed.to_string(),
        scheme,
        hostname: host.hostname,
        subdomain: host.subdomain,
        domain: host.domain,
        tld: host.tld,
        path_segments,
        query: parse_query(query),
    })
}

fn decode_segment(segment: &str) -> String {
    let bytes = urlencoding::decode_binary(segment.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Memoizing decomposer. Safe to share across threads; each distinct input
/// string is decomposed at most once for the decomposer's lifetime.
#[derive(Debug, Default)]
pub struct Decomposer {
    cache: Memo<String, Result<Arc<DecomposedUrl>, DecomposeError>>,
}

impl Decomposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decompose(&self, raw: &str) -> Result<Arc<DecomposedUrl>, DecomposeError> {
        self.cache.get_or_fill(raw, || decompose(raw).map(Arc::new))
    }

    /// Number of distinct inputs decomposed so far.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_url_round_trips_components() {
        let d = decompose("https://sub.example.com/a/b/c?x=1&y=two").unwrap();
        assert_eq!(d.scheme, Scheme::Https);
        assert_eq!(d.hostname, "sub.example.com");
        assert_eq!(d.subdomain, "sub");
        assert_eq!(d.domain, "example.com");
        assert_eq!(d.tld, "com");
        assert_eq!(d.path_segments, vec!["a", "b", "c"]);
        assert_eq!(d.param("x"), Some("1"));
        assert_eq!(d.param("y"), Some("two"));
    }

    #[test]
    fn empty_segments_and_fragment_are_dropped() {
        let d = decompose("http://example.com//users///12/#top").unwrap();
        assert_eq!(d.scheme, Scheme::Http);
        assert_eq!(d.path_segments, vec!["users", "12"]);
        assert!(d.query.is_empty());
    }

    #[test]
    fn segments_are_percent_decoded() {
        let d = decompose("https://example.com/tags/blue%20sky").unwrap();
        assert_eq!(d.segment(1), Some("blue sky"));
    }

    #[test]
    fn scheme_token_is_case_insensitive_and_input_trimmed() {
        let d = decompose("  HTTPS://Example.com/x  ").unwrap();
        assert_eq!(d.scheme, Scheme::Https);
        assert_eq!(d.raw, "HTTPS://Example.com/x");
        assert_eq!(d.hostname, "example.com");
    }

    #[test]
    fn unsupported_schemes() {
        for raw in ["ftp://example.com/file", "example.com/path", "javascript:void(0)", ""] {
            assert!(
                matches!(decompose(raw), Err(DecomposeError::UnsupportedScheme { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_hosts() {
        for raw in ["https://localhost/x", "https:///path", "http://.com/", "https://"] {
            assert!(
                matches!(decompose(raw), Err(DecomposeError::MalformedHost { .. })),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn decomposer_caches_per_input() {
        let decomposer = Decomposer::new();
        let a = decomposer.decompose("https://example.com/a").unwrap();
        let b = decomposer.decompose("https://example.com/a").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(decomposer.decompose("ftp://example.com").is_err());
        assert!(decomposer.decompose("ftp://example.com").is_err());
        assert_eq!(decomposer.cached(), 2);
    }

    #[test]
    fn equal_strings_decompose_identically() {
        let raw = "https://www.example.com/p/1?q=\\u0026";
        assert_eq!(decompose(raw).unwrap(), decompose(raw).unwrap());
    }
}
