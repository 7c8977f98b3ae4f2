//! Integration tests: feed pagination, stop conditions, partial progress and retry.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{post_url, Entry, ScriptedSource};
use linkscope_core::feed::{
    run_feeds, FeedEngine, FeedError, FeedOptions, MemorySink, RetryingFeed, RunFeed, SourceError,
    StopReason,
};
use linkscope_core::retry::{run_feed_with_retry, RetryPolicy};

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

fn urls(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| post_url(id)).collect()
}

#[test]
fn stops_at_first_known_post_without_fetching_further() {
    let source = ScriptedSource::new(
        "latest",
        vec![
            vec![Entry::Post("A"), Entry::Post("B"), Entry::Post("C")],
            vec![Entry::Post("D"), Entry::Post("E")],
        ],
    );
    let log = source.fetch_log();
    let sink = MemorySink::with_known([post_url("B")]);
    let mut engine = FeedEngine::new(source, sink);

    let report = engine.run().unwrap();
    assert_eq!(report.registered, urls(&["A"]));
    assert_eq!(report.stop, StopReason::ReachedKnown(post_url("B")));
    assert_eq!(report.pages, 1);
    assert_eq!(*log.lock().unwrap(), vec![0]);
    assert_eq!(engine.sink().registered_urls(), urls(&["A"]));
}

#[test]
fn transient_error_keeps_partial_progress() {
    let source = ScriptedSource::new(
        "latest",
        vec![vec![Entry::Post("X"), Entry::Post("Y")], vec![Entry::Post("Z")]],
    )
    .fail_page(1, SourceError::transient("connection reset"));
    let sink = Arc::new(Mutex::new(MemorySink::new()));
    let mut engine = FeedEngine::new(source, Arc::clone(&sink));

    let err = engine.run().unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.page(), 2);
    assert_eq!(err.registered(), urls(&["X", "Y"]).as_slice());
    assert!(matches!(err, FeedError::Transient { .. }));
    assert_eq!(sink.lock().unwrap().registered_urls(), urls(&["X", "Y"]));
    assert!(engine.is_interrupted());
}

#[test]
fn auth_failure_is_fatal() {
    let source = ScriptedSource::new("bookmarks", vec![vec![Entry::Post("A")]])
        .fail_page(0, SourceError::Auth("session expired".into()));
    let mut engine = FeedEngine::new(source, MemorySink::new());

    let err = engine.run().unwrap_err();
    assert!(matches!(err, FeedError::Fatal { .. }));
    assert_eq!(err.feed(), "bookmarks");
    assert!(err.registered().is_empty());
    assert!(engine.sink().is_empty());
}

#[test]
fn skipped_entries_do_not_stop_the_run() {
    let source = ScriptedSource::new(
        "latest",
        vec![
            vec![Entry::Junk, Entry::Post("A"), Entry::Junk],
            vec![Entry::Post("B")],
        ],
    );
    let mut engine = FeedEngine::new(source, MemorySink::new());

    let report = engine.run().unwrap();
    assert_eq!(report.registered, urls(&["A", "B"]));
    assert_eq!(report.skipped, 2);
    assert_eq!(report.pages, 2);
    assert_eq!(report.stop, StopReason::Exhausted);
    assert_eq!(report.attempts, 1);
}

#[test]
fn repeated_post_within_a_run_registers_once() {
    // pages shifting under a live listing repeat entries
    let source = ScriptedSource::new(
        "latest",
        vec![
            vec![Entry::Post("A"), Entry::Post("B")],
            vec![Entry::Post("B"), Entry::Post("C")],
        ],
    );
    let mut engine = FeedEngine::new(source, MemorySink::new());

    let report = engine.run().unwrap();
    assert_eq!(report.registered, urls(&["A", "B", "C"]));
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.stop, StopReason::Exhausted);
}

#[test]
fn page_bound_stops_bounded_feeds() {
    let source = ScriptedSource::new(
        "search",
        vec![
            vec![Entry::Post("A")],
            vec![Entry::Post("B")],
            vec![Entry::Post("C")],
        ],
    );
    let log = source.fetch_log();
    let options = FeedOptions { max_pages: Some(2) };
    let mut engine = FeedEngine::with_options(source, MemorySink::new(), options);

    let report = engine.run().unwrap();
    assert_eq!(report.stop, StopReason::PageLimit);
    assert_eq!(report.registered, urls(&["A", "B"]));
    assert_eq!(*log.lock().unwrap(), vec![0, 1]);
}

#[test]
fn second_run_stops_at_what_the_first_registered() {
    let source = ScriptedSource::new("latest", vec![vec![Entry::Post("A"), Entry::Post("B")]]);
    let mut engine = FeedEngine::new(source, MemorySink::new());

    engine.run().unwrap();
    let report = engine.run().unwrap();
    assert!(report.registered.is_empty());
    assert_eq!(report.stop, StopReason::ReachedKnown(post_url("A")));
}

#[test]
fn retry_resumes_from_the_failed_page() {
    let source = ScriptedSource::new(
        "latest",
        vec![vec![Entry::Post("X"), Entry::Post("Y")], vec![Entry::Post("Z")]],
    )
    .fail_page(1, SourceError::transient("timeout"))
    .fail_page(1, SourceError::transient("timeout"));
    let log = source.fetch_log();
    let mut engine = FeedEngine::new(source, MemorySink::new());

    let report = run_feed_with_retry(&fast_policy(3), &mut engine).unwrap();
    assert_eq!(report.registered, urls(&["X", "Y", "Z"]));
    assert_eq!(report.attempts, 3);
    assert_eq!(report.pages, 2);
    assert_eq!(*log.lock().unwrap(), vec![0, 1, 1, 1]);
    assert_eq!(engine.sink().registered_urls(), urls(&["X", "Y", "Z"]));
    assert!(!engine.is_interrupted());
}

#[test]
fn retry_gives_up_and_reports_progress() {
    let source = ScriptedSource::new(
        "latest",
        vec![vec![Entry::Post("X")], vec![Entry::Post("Z")]],
    )
    .fail_page(1, SourceError::transient("503"))
    .fail_page(1, SourceError::transient("503"))
    .fail_page(1, SourceError::transient("503"));
    let mut engine = FeedEngine::new(source, MemorySink::new());

    let err = run_feed_with_retry(&fast_policy(2), &mut engine).unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.registered(), urls(&["X"]).as_slice());
}

#[test]
fn fatal_errors_are_not_retried() {
    let source = ScriptedSource::new("latest", vec![vec![Entry::Post("X")]])
        .fail_page(0, SourceError::fatal("listing removed"));
    let log = source.fetch_log();
    let mut engine = FeedEngine::new(source, MemorySink::new());

    let err = run_feed_with_retry(&fast_policy(5), &mut engine).unwrap_err();
    assert!(!err.is_transient());
    assert_eq!(*log.lock().unwrap(), vec![0]);
}

#[tokio::test]
async fn feeds_run_concurrently_and_fail_independently() {
    let shared = Arc::new(Mutex::new(MemorySink::new()));

    let ok = FeedEngine::new(
        ScriptedSource::new("ok", vec![vec![Entry::Post("A")], vec![Entry::Post("B")]]),
        Arc::clone(&shared),
    );
    let broken = FeedEngine::new(
        ScriptedSource::new("broken", vec![vec![Entry::Post("C")]])
            .fail_page(0, SourceError::Auth("bad cookie".into())),
        Arc::clone(&shared),
    );
    let flaky = RetryingFeed::new(
        FeedEngine::new(
            ScriptedSource::new("flaky", vec![vec![Entry::Post("D")]])
                .fail_page(0, SourceError::transient("reset")),
            Arc::clone(&shared),
        ),
        fast_policy(3),
    );

    let feeds: Vec<Box<dyn RunFeed>> = vec![Box::new(ok), Box::new(broken), Box::new(flaky)];
    let outcomes = run_feeds(feeds, 2).await;

    let names: Vec<&str> = outcomes.iter().map(|o| o.feed.as_str()).collect();
    assert_eq!(names, vec!["ok", "broken", "flaky"]);
    assert_eq!(outcomes[0].result.as_ref().unwrap().registered, urls(&["A", "B"]));
    assert!(matches!(outcomes[1].result, Err(FeedError::Fatal { .. })));
    assert_eq!(outcomes[2].result.as_ref().unwrap().attempts, 2);

    let mut registered = shared.lock().unwrap().registered_urls();
    registered.sort();
    assert_eq!(registered, urls(&["A", "B", "D"]));
}
