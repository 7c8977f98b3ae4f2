//! Shared helpers for integration tests: a scripted feed source, a canned
//! session and a local HTTP server.

#![allow(dead_code)]

pub mod http_server;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use linkscope_core::feed::{FeedSource, Page, PostRecord, SourceError};
use linkscope_core::session::{Document, Fetched, Session, SessionError};
use linkscope_core::variant::{Behavior, Identity, UrlVariant, VariantKind};

/// One raw feed entry.
#[derive(Debug, Clone)]
pub enum Entry {
    Post(&'static str),
    /// An entry the source maps to nothing (ads, deleted placeholders).
    Junk,
}

pub fn post(id: &str) -> UrlVariant {
    UrlVariant::new(
        "feedsite",
        VariantKind::Post,
        Identity::new().with("id", id),
        Behavior::template("https://feed.example/posts/{id}"),
    )
}

pub fn asset(id: &str) -> UrlVariant {
    UrlVariant::new(
        "feedsite",
        VariantKind::PostAsset,
        Identity::new().with("file", format!("{id}_0.jpg")),
        Behavior::template("https://feed.example/media/{file}"),
    )
}

pub fn post_url(id: &str) -> String {
    post(id).normalize()
}

/// Pages addressed by index; the cursor is the next page's index. Errors
/// can be queued per page and are returned before the page itself.
pub struct ScriptedSource {
    name: String,
    pages: Vec<Vec<Entry>>,
    failures: HashMap<usize, VecDeque<SourceError>>,
    fetched: Arc<Mutex<Vec<usize>>>,
}

impl ScriptedSource {
    pub fn new(name: &str, pages: Vec<Vec<Entry>>) -> Self {
        Self {
            name: name.to_string(),
            pages,
            failures: HashMap::new(),
            fetched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Makes the next fetch of page `index` (0-based) fail with `error`.
    pub fn fail_page(mut self, index: usize, error: SourceError) -> Self {
        self.failures.entry(index).or_default().push_back(error);
        self
    }

    /// Page indices requested so far (failed requests included).
    pub fn fetch_log(&self) -> Arc<Mutex<Vec<usize>>> {
        Arc::clone(&self.fetched)
    }
}

impl FeedSource for ScriptedSource {
    type Entry = Entry;
    type Cursor = usize;

    fn name(&self) -> &str {
        &self.name
    }

    fn next_page(&mut self, cursor: Option<&usize>) -> Result<Page<Entry, usize>, SourceError> {
        let index = cursor.copied().unwrap_or(0);
        self.fetched.lock().unwrap().push(index);
        if let Some(err) = self.failures.get_mut(&index).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        let entries = self.pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < self.pages.len()).then_some(index + 1);
        Ok(Page::new(entries, next))
    }

    fn map(&self, entry: Entry) -> Option<PostRecord> {
        match entry {
            Entry::Post(id) => PostRecord::new(post(id), vec![asset(id)], 1_700_000_000, 0).ok(),
            Entry::Junk => None,
        }
    }
}

/// Session answering from a fixed table; counts fetches.
pub struct CannedSession {
    site: &'static str,
    responses: HashMap<String, Result<Document, SessionError>>,
    pub fetches: AtomicUsize,
}

impl CannedSession {
    pub fn new(site: &'static str) -> Self {
        Self {
            site,
            responses: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn json(mut self, url: &str, body: serde_json::Value) -> Self {
        self.responses.insert(url.to_string(), Ok(Document::Json(body)));
        self
    }

    pub fn html(mut self, url: &str, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), Ok(Document::Html(body.to_string())));
        self
    }

    pub fn error(mut self, url: &str, err: SessionError) -> Self {
        self.responses.insert(url.to_string(), Err(err));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Session for CannedSession {
    fn site(&self) -> &str {
        self.site
    }

    fn fetch(&self, url: &str) -> Result<Fetched, SessionError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(Fetched {
                url: url.to_string(),
                status: 200,
                body: body.clone(),
            }),
            Some(Err(e)) => Err(e.clone()),
            None => Err(SessionError::NotFound {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
