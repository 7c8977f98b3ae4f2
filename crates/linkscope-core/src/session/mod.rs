//! Per-site sessions.
//!
//! A [`Session`] is the transport a site's resolvers and feed sources fetch
//! through. Sessions are created lazily by [`SessionRegistry`], at most once
//! per site, and then shared; login (if any) happens inside the factory.

mod http;
mod registry;

pub use http::HttpSession;
pub use registry::{SessionFactory, SessionRegistry};

use thiserror::Error;

use crate::retry::{Classify, ErrorKind};

/// Authenticated (or anonymous) transport for one site.
pub trait Session: Send + Sync {
    /// Site name this session belongs to.
    fn site(&self) -> &str;

    /// Fetches `url` and returns the decoded body.
    fn fetch(&self, url: &str) -> Result<Fetched, SessionError>;
}

/// Parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Json(serde_json::Value),
    Html(String),
}

/// A successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub body: Document,
}

impl Fetched {
    pub fn json(&self) -> Option<&serde_json::Value> {
        match &self.body {
            Document::Json(v) => Some(v),
            Document::Html(_) => None,
        }
    }

    pub fn html(&self) -> Option<&str> {
        match &self.body {
            Document::Html(s) => Some(s),
            Document::Json(_) => None,
        }
    }

    /// JSON body or a `Decode` error naming this response.
    pub fn require_json(&self) -> Result<&serde_json::Value, SessionError> {
        self.json().ok_or_else(|| SessionError::Decode {
            url: self.url.clone(),
            message: "expected a JSON body".to_string(),
        })
    }

    /// Resolves a possibly relative link against the final URL.
    pub fn resolve_link(&self, href: &str) -> Option<String> {
        let base = url::Url::parse(&self.url).ok()?;
        base.join(href).ok().map(String::from)
    }
}

/// Why a fetch failed.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// No factory was registered for the site.
    #[error("no session configured for site {0:?}")]
    Unconfigured(String),
    /// The resource does not exist (404/410). Liveness probes treat this as deleted.
    #[error("{url}: not found (HTTP {status})")]
    NotFound { url: String, status: u16 },
    /// Any other non-success status.
    #[error("{url}: HTTP {status}")]
    Http {
        url: String,
        status: u16,
        kind: ErrorKind,
    },
    /// The request never produced a status (DNS, connect, timeout, ...).
    #[error("{url}: {message}")]
    Transport {
        url: String,
        message: String,
        kind: ErrorKind,
    },
    /// Login failed or credentials were rejected.
    #[error("authentication failed for {site}: {message}")]
    Auth { site: String, message: String },
    /// The body could not be decoded into what the caller needed.
    #[error("{url}: cannot decode response: {message}")]
    Decode { url: String, message: String },
}

impl Classify for SessionError {
    fn error_kind(&self) -> ErrorKind {
        match self {
            SessionError::Unconfigured(_) | SessionError::Decode { .. } => ErrorKind::Other,
            SessionError::NotFound { .. } => ErrorKind::Gone,
            SessionError::Http { kind, .. } | SessionError::Transport { kind, .. } => *kind,
            SessionError::Auth { .. } => ErrorKind::Auth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: Document) -> Fetched {
        Fetched {
            url: "https://example.com/users/1/profile".to_string(),
            status: 200,
            body,
        }
    }

    #[test]
    fn resolve_link_handles_relative_and_absolute() {
        let f = page(Document::Html(String::new()));
        assert_eq!(
            f.resolve_link("../2").as_deref(),
            Some("https://example.com/users/2")
        );
        assert_eq!(
            f.resolve_link("/art/9").as_deref(),
            Some("https://example.com/art/9")
        );
        assert_eq!(
            f.resolve_link("https://other.org/x").as_deref(),
            Some("https://other.org/x")
        );
    }

    #[test]
    fn require_json_on_html_is_decode_error() {
        let f = page(Document::Html("<html></html>".to_string()));
        assert!(matches!(f.require_json(), Err(SessionError::Decode { .. })));
        let f = page(Document::Json(serde_json::json!({"ok": true})));
        assert_eq!(f.require_json().unwrap()["ok"], true);
    }

    #[test]
    fn error_kinds() {
        let nf = SessionError::NotFound {
            url: "u".into(),
            status: 404,
        };
        assert_eq!(nf.error_kind(), ErrorKind::Gone);
        let t = SessionError::Transport {
            url: "u".into(),
            message: "timed out".into(),
            kind: ErrorKind::Timeout,
        };
        assert!(t.error_kind().is_retryable());
        let a = SessionError::Auth {
            site: "s".into(),
            message: "bad password".into(),
        };
        assert_eq!(a.error_kind(), ErrorKind::Auth);
    }
}
