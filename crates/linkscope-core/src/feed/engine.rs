//! Sequential pagination state machine.

use std::collections::HashSet;

use thiserror::Error;

use super::{FeedSource, RegistrationSink, SourceError};
use crate::retry::{Classify, ErrorKind};

/// Per-run bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedOptions {
    /// Stop after this many pages even if the source has more.
    pub max_pages: Option<usize>,
}

/// Why a run ended normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The source returned a page without a next cursor.
    Exhausted,
    /// Reached a post the sink already knows (canonical URL).
    ReachedKnown(String),
    /// Hit [`FeedOptions::max_pages`].
    PageLimit,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReport {
    pub feed: String,
    /// Pages fetched.
    pub pages: usize,
    /// Canonical URLs of registered posts, in registration order.
    pub registered: Vec<String>,
    /// Entries the source mapped to nothing.
    pub skipped: usize,
    /// Posts already registered earlier in the same run.
    pub duplicates: usize,
    pub stop: StopReason,
    /// `run`/`resume` calls it took to finish (1 without retries).
    pub attempts: u32,
}

/// A run aborted by its source. Posts registered before the failure stay
/// registered and are listed in `registered`.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    #[error("feed {feed}: page {page} failed after {} registered posts (retryable): {source}", .registered.len())]
    Transient {
        feed: String,
        page: usize,
        registered: Vec<String>,
        source: SourceError,
    },
    #[error("feed {feed}: page {page} failed after {} registered posts: {source}", .registered.len())]
    Fatal {
        feed: String,
        page: usize,
        registered: Vec<String>,
        source: SourceError,
    },
}

impl FeedError {
    fn from_source(feed: String, page: usize, registered: Vec<String>, source: SourceError) -> Self {
        if source.is_transient() {
            FeedError::Transient {
                feed,
                page,
                registered,
                source,
            }
        } else {
            FeedError::Fatal {
                feed,
                page,
                registered,
                source,
            }
        }
    }

    pub fn feed(&self) -> &str {
        match self {
            FeedError::Transient { feed, .. } | FeedError::Fatal { feed, .. } => feed,
        }
    }

    /// 1-based index of the page that failed.
    pub fn page(&self) -> usize {
        match self {
            FeedError::Transient { page, .. } | FeedError::Fatal { page, .. } => *page,
        }
    }

    /// Posts registered before the abort.
    pub fn registered(&self) -> &[String] {
        match self {
            FeedError::Transient { registered, .. } | FeedError::Fatal { registered, .. } => {
                registered
            }
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, FeedError::Transient { .. })
    }
}

impl Classify for FeedError {
    fn error_kind(&self) -> ErrorKind {
        match self {
            FeedError::Transient { source, .. } => source.error_kind(),
            FeedError::Fatal { source, .. } => match source.error_kind() {
                ErrorKind::Auth => ErrorKind::Auth,
                _ => ErrorKind::Other,
            },
        }
    }
}

/// Progress of the current run; kept across a failed page so the run can
/// be resumed from that page.
struct RunState<C> {
    cursor: Option<C>,
    pages: usize,
    registered: Vec<String>,
    skipped: usize,
    duplicates: usize,
    seen: HashSet<String>,
    attempts: u32,
}

impl<C> Default for RunState<C> {
    fn default() -> Self {
        Self {
            cursor: None,
            pages: 0,
            registered: Vec::new(),
            skipped: 0,
            duplicates: 0,
            seen: HashSet::new(),
            attempts: 0,
        }
    }
}

/// Drives one [`FeedSource`] into one [`RegistrationSink`].
pub struct FeedEngine<S: FeedSource, K> {
    source: S,
    sink: K,
    options: FeedOptions,
    interrupted: Option<RunState<S::Cursor>>,
}

impl<S, K> FeedEngine<S, K>
where
    S: FeedSource,
    K: RegistrationSink,
{
    pub fn new(source: S, sink: K) -> Self {
        Self::with_options(source, sink, FeedOptions::default())
    }

    pub fn with_options(source: S, sink: K, options: FeedOptions) -> Self {
        Self {
            source,
            sink,
            options,
            interrupted: None,
        }
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }

    /// True when the last run failed and [`FeedEngine::resume`] would pick it up.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.is_some()
    }

    /// Starts a fresh run from the first page.
    pub fn run(&mut self) -> Result<FeedReport, FeedError> {
        if self.interrupted.take().is_some() {
            tracing::debug!(feed = self.source.name(), "discarding interrupted run");
        }
        tracing::info!(feed = self.source.name(), "feed run started");
        self.drive(RunState::default())
    }

    /// Continues an interrupted run from the page that failed, keeping what
    /// the run already saw and registered. Without an interrupted run this
    /// is the same as [`FeedEngine::run`].
    pub fn resume(&mut self) -> Result<FeedReport, FeedError> {
        match self.interrupted.take() {
            Some(state) => {
                tracing::info!(
                    feed = self.source.name(),
                    page = state.pages + 1,
                    "feed run resumed"
                );
                self.drive(state)
            }
            None => self.run(),
        }
    }

    fn drive(&mut self, mut state: RunState<S::Cursor>) -> Result<FeedReport, FeedError> {
        state.attempts += 1;
        let stop = loop {
            if let Some(max) = self.options.max_pages {
                if state.pages >= max {
                    break StopReason::PageLimit;
                }
            }

            let page = match self.source.next_page(state.cursor.as_ref()) {
                Ok(page) => page,
                Err(e) => return Err(self.abort(state, e)),
            };
            state.pages += 1;
            tracing::debug!(
                feed = self.source.name(),
                page = state.pages,
                entries = page.entries.len(),
                "fetched page"
            );

            if let Some(known) = self.map_page(&mut state, page.entries) {
                break StopReason::ReachedKnown(known);
            }

            match page.next {
                Some(next) => state.cursor = Some(next),
                None => break StopReason::Exhausted,
            }
        };

        let report = FeedReport {
            feed: self.source.name().to_string(),
            pages: state.pages,
            registered: state.registered,
            skipped: state.skipped,
            duplicates: state.duplicates,
            stop,
            attempts: state.attempts,
        };
        tracing::info!(
            feed = %report.feed,
            pages = report.pages,
            registered = report.registered.len(),
            stop = ?report.stop,
            "feed run finished"
        );
        Ok(report)
    }

    /// Maps and registers one page. Returns the known post that stops the run.
    fn map_page(
        &mut self,
        state: &mut RunState<S::Cursor>,
        entries: Vec<S::Entry>,
    ) -> Option<String> {
        for entry in entries {
            let Some(record) = self.source.map(entry) else {
                state.skipped += 1;
                continue;
            };
            let url = record.normalized_post();
            if state.seen.contains(&url) {
                state.duplicates += 1;
                continue;
            }
            if self.sink.is_known(&url) {
                tracing::debug!(feed = self.source.name(), url = %url, "reached known post");
                return Some(url);
            }
            self.sink.register(record);
            tracing::debug!(feed = self.source.name(), url = %url, "registered post");
            state.seen.insert(url.clone());
            state.registered.push(url);
        }
        None
    }

    fn abort(&mut self, state: RunState<S::Cursor>, source: SourceError) -> FeedError {
        let feed = self.source.name().to_string();
        let page = state.pages + 1;
        let registered = state.registered.clone();
        tracing::warn!(
            feed = %feed,
            page,
            registered = registered.len(),
            error = %source,
            "feed run aborted"
        );
        self.interrupted = Some(state);
        FeedError::from_source(feed, page, registered, source)
    }
}
