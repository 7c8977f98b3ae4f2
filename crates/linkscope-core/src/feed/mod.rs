//! Feed engine.
//!
//! A feed walks one paginated source newest-first, maps each entry to a
//! [`PostRecord`] and hands new posts to a [`RegistrationSink`]. The run stops
//! at the first post the sink already knows, when the source has no next
//! page, or at an optional page bound. Pages are fetched sequentially; the
//! engine never retries on its own (see [`crate::retry::run_feed_with_retry`]).

mod engine;
mod parallel;
mod record;
mod sink;

pub use engine::{FeedEngine, FeedError, FeedOptions, FeedReport, StopReason};
pub use parallel::{run_feeds, FeedOutcome, RetryingFeed, RunFeed};
pub use record::{PostRecord, RecordError};
pub use sink::{MemorySink, RegistrationSink};

use std::fmt;

use thiserror::Error;

use crate::retry::{Classify, ErrorKind};
use crate::session::SessionError;

/// One page of entries plus the cursor of the next page (`None` = last page).
#[derive(Debug, Clone)]
pub struct Page<E, C> {
    pub entries: Vec<E>,
    pub next: Option<C>,
}

impl<E, C> Page<E, C> {
    pub fn new(entries: Vec<E>, next: Option<C>) -> Self {
        Self { entries, next }
    }

    /// A final page.
    pub fn last(entries: Vec<E>) -> Self {
        Self {
            entries,
            next: None,
        }
    }
}

/// A paginated data source (a site listing, search, bookmark page, ...).
pub trait FeedSource {
    /// Raw entry as the source yields it.
    type Entry;
    /// Opaque pagination token.
    type Cursor: Clone + fmt::Debug;

    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Fetches the page at `cursor`; `None` requests the first page.
    fn next_page(
        &mut self,
        cursor: Option<&Self::Cursor>,
    ) -> Result<Page<Self::Entry, Self::Cursor>, SourceError>;

    /// Maps an entry to a record; `None` skips the entry.
    fn map(&self, entry: Self::Entry) -> Option<PostRecord>;
}

/// Why a page could not be fetched.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// May succeed if tried again later (timeouts, throttling, 5xx).
    #[error("{message}")]
    Transient { message: String, kind: ErrorKind },
    /// Credentials were rejected; retrying without intervention is pointless.
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("{0}")]
    Fatal(String),
}

impl SourceError {
    pub fn transient(message: impl Into<String>) -> Self {
        SourceError::Transient {
            message: message.into(),
            kind: ErrorKind::Connection,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        SourceError::Fatal(message.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transient { .. })
    }
}

impl Classify for SourceError {
    fn error_kind(&self) -> ErrorKind {
        match self {
            SourceError::Transient { kind, .. } => *kind,
            SourceError::Auth(_) => ErrorKind::Auth,
            SourceError::Fatal(_) => ErrorKind::Other,
        }
    }
}

impl From<SessionError> for SourceError {
    fn from(e: SessionError) -> Self {
        match e.error_kind() {
            kind if kind.is_retryable() => SourceError::Transient {
                message: e.to_string(),
                kind,
            },
            ErrorKind::Auth => SourceError::Auth(e.to_string()),
            _ => SourceError::Fatal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_map_by_kind() {
        let timeout = SessionError::Transport {
            url: "u".into(),
            message: "timed out".into(),
            kind: ErrorKind::Timeout,
        };
        assert!(SourceError::from(timeout).is_transient());

        let throttled = SessionError::Http {
            url: "u".into(),
            status: 429,
            kind: ErrorKind::Throttled,
        };
        assert!(SourceError::from(throttled).is_transient());

        let auth = SessionError::Auth {
            site: "s".into(),
            message: "expired".into(),
        };
        assert!(matches!(SourceError::from(auth), SourceError::Auth(_)));

        let gone = SessionError::NotFound {
            url: "u".into(),
            status: 404,
        };
        assert!(matches!(SourceError::from(gone), SourceError::Fatal(_)));
    }
}
