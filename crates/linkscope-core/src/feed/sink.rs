use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use super::PostRecord;

/// Where discovered posts go. Persistence is the implementor's business.
pub trait RegistrationSink {
    /// True if the post (by canonical URL) was registered before.
    fn is_known(&self, normalized_post: &str) -> bool;

    fn register(&mut self, record: PostRecord);
}

/// Lets several feeds (or a test and a feed) share one sink.
impl<T: RegistrationSink> RegistrationSink for Arc<Mutex<T>> {
    fn is_known(&self, normalized_post: &str) -> bool {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_known(normalized_post)
    }

    fn register(&mut self, record: PostRecord) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .register(record)
    }
}

/// In-memory sink: remembers known post URLs and keeps registered records
/// in registration order.
#[derive(Debug, Default)]
pub struct MemorySink {
    known: HashSet<String>,
    records: Vec<PostRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that already knows these canonical post URLs.
    pub fn with_known<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: known.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[PostRecord] {
        &self.records
    }

    /// Canonical URLs of registered posts, in registration order.
    pub fn registered_urls(&self) -> Vec<String> {
        self.records.iter().map(PostRecord::normalized_post).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RegistrationSink for MemorySink {
    fn is_known(&self, normalized_post: &str) -> bool {
        self.known.contains(normalized_post)
    }

    fn register(&mut self, record: PostRecord) {
        self.known.insert(record.normalized_post());
        self.records.push(record);
    }
}
