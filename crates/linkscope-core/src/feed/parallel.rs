//! Run several feeds concurrently.
//!
//! Keeps up to `max_concurrent` feeds running at once on the blocking pool;
//! when one finishes the next queued feed is started. Feeds are independent:
//! one feed failing (or panicking) never affects another.

use std::panic::{self, AssertUnwindSafe};

use super::{FeedEngine, FeedError, FeedReport, FeedSource, RegistrationSink, SourceError};
use crate::retry::{run_feed_with_retry, RetryPolicy};

/// A feed ready to run on a worker thread.
pub trait RunFeed: Send {
    fn feed_name(&self) -> String;

    fn run_feed(&mut self) -> Result<FeedReport, FeedError>;
}

impl<S, K> RunFeed for FeedEngine<S, K>
where
    S: FeedSource + Send,
    S::Cursor: Send,
    K: RegistrationSink + Send,
{
    fn feed_name(&self) -> String {
        self.name().to_string()
    }

    fn run_feed(&mut self) -> Result<FeedReport, FeedError> {
        self.run()
    }
}

/// A feed run wrapped in a retry policy: transient failures resume the run
/// after backoff.
pub struct RetryingFeed<S: FeedSource, K> {
    engine: FeedEngine<S, K>,
    policy: RetryPolicy,
}

impl<S, K> RetryingFeed<S, K>
where
    S: FeedSource,
    K: RegistrationSink,
{
    pub fn new(engine: FeedEngine<S, K>, policy: RetryPolicy) -> Self {
        Self { engine, policy }
    }

    pub fn into_engine(self) -> FeedEngine<S, K> {
        self.engine
    }
}

impl<S, K> RunFeed for RetryingFeed<S, K>
where
    S: FeedSource + Send,
    S::Cursor: Send,
    K: RegistrationSink + Send,
{
    fn feed_name(&self) -> String {
        self.engine.name().to_string()
    }

    fn run_feed(&mut self) -> Result<FeedReport, FeedError> {
        run_feed_with_retry(&self.policy, &mut self.engine)
    }
}

/// Result of one feed in a [`run_feeds`] batch.
#[derive(Debug)]
pub struct FeedOutcome {
    pub feed: String,
    pub result: Result<FeedReport, FeedError>,
}

/// Runs `feeds` with at most `max_concurrent` in flight. Outcomes are
/// returned in input order.
pub async fn run_feeds(feeds: Vec<Box<dyn RunFeed>>, max_concurrent: usize) -> Vec<FeedOutcome> {
    let max_concurrent = max_concurrent.max(1);
    let names: Vec<String> = feeds.iter().map(|f| f.feed_name()).collect();
    let mut outcomes: Vec<Option<FeedOutcome>> = names.iter().map(|_| None).collect();
    let mut queue = feeds.into_iter().enumerate();
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < max_concurrent {
            let Some((index, mut feed)) = queue.next() else {
                break;
            };
            join_set.spawn_blocking(move || {
                let name = feed.feed_name();
                let result = panic::catch_unwind(AssertUnwindSafe(|| feed.run_feed()))
                    .unwrap_or_else(|_| Err(panicked(&name)));
                (index, FeedOutcome { feed: name, result })
            });
        }

        if join_set.is_empty() {
            break;
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => tracing::error!("feed task join: {}", e),
        }
    }

    outcomes
        .into_iter()
        .zip(names)
        .map(|(outcome, name)| {
            outcome.unwrap_or_else(|| {
                let result = Err(panicked(&name));
                FeedOutcome { feed: name, result }
            })
        })
        .collect()
}

fn panicked(feed: &str) -> FeedError {
    tracing::error!(feed, "feed task panicked");
    FeedError::Fatal {
        feed: feed.to_string(),
        page: 0,
        registered: Vec::new(),
        source: SourceError::fatal("feed task panicked"),
    }
}
