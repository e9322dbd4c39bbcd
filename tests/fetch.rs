
use std::sync::Arc;

use event_pantry::worker::progress::FetchEvent;
use event_pantry::worker::{CancelHandle, FetchWorker};
use event_pantry::{Category, Config, Error, Provider};

use scenarii::{date, event, scripted_pages, MockSource};

fn test_config(cache_folder: &std::path::Path) -> Config {
    Config::new(
        "https://mock.invalid/wp-json/wp/v2/posts".parse().unwrap(),
        "https://mock.invalid/wp-json/wp/v2/categories".parse().unwrap(),
        cache_folder,
    )
}

/// Run a worker over the given source and collect every event it emits,
/// in order, until its terminal event closes the channel
async fn collect_events(source: MockSource) -> Vec<FetchEvent> {
    let worker = FetchWorker::new(Arc::new(source));
    let (_handle, mut receiver) = worker.spawn();

    let mut events = Vec::new();
    while let Some(event) = receiver.recv().await {
        events.push(event);
    }
    events
}

fn page_numbers(events: &[FetchEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            FetchEvent::PageCompleted { page, .. } => Some(*page),
            _ => None,
        })
        .collect()
}

fn terminal_count(events: &[FetchEvent]) -> usize {
    events.iter().filter(|e| e.is_terminal()).count()
}

#[tokio::test]
async fn a_full_fetch_delivers_every_page_then_completes() {
    let _ = env_logger::builder().is_test(true).try_init();

    let source = MockSource::new(scripted_pages(3, 2))
        .with_categories(vec![Category { id: 5, name: "Festival".to_string() }]);
    let events = collect_events(source).await;

    assert!(matches!(events[0], FetchEvent::CategoriesResolved(_)));
    assert_eq!(page_numbers(&events), vec![1, 2, 3]);
    assert_eq!(terminal_count(&events), 1);
    assert!(matches!(events.last(), Some(FetchEvent::Completed { pages_total: 3 })));

    // Each page is followed by its cumulative progress
    let progress: Vec<(u32, u32)> = events
        .iter()
        .filter_map(|e| match e {
            FetchEvent::Progress { pages_done, pages_total } => Some((*pages_done, *pages_total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn a_page_failing_every_retry_ends_the_run_with_failed() {
    let _ = env_logger::builder().is_test(true).try_init();

    let source = MockSource::new(scripted_pages(5, 2)).failing_from_page(3);
    let events = collect_events(source).await;

    assert_eq!(page_numbers(&events), vec![1, 2]);
    assert_eq!(terminal_count(&events), 1);
    match events.last() {
        Some(FetchEvent::Failed { error, pages_done }) => {
            assert_eq!(*pages_done, 2);
            assert!(matches!(error, Error::Network { .. }));
        }
        other => panic!("expected a Failed terminal event, got {:?}", other),
    }
    assert!(!events.iter().any(|e| matches!(e, FetchEvent::Completed { .. })));
}

#[tokio::test]
async fn cancelling_after_a_page_requests_no_further_pages() {
    let _ = env_logger::builder().is_test(true).try_init();

    // The mock flips the cancel flag right after serving page 2, so the worker
    // sees it on its next between-pages check
    let cancel = CancelHandle::new();
    let source = Arc::new(
        MockSource::new(scripted_pages(5, 2)).cancelling_after_page(2, cancel.clone()),
    );
    let worker = FetchWorker::with_cancel_handle(Arc::clone(&source), cancel);
    let (_handle, mut receiver) = worker.spawn();

    let mut events = Vec::new();
    while let Some(event) = receiver.recv().await {
        events.push(event);
    }

    assert_eq!(page_numbers(&events), vec![1, 2]);
    assert_eq!(terminal_count(&events), 1);
    assert!(matches!(events.last(), Some(FetchEvent::Cancelled { pages_done: 2 })));
    assert_eq!(source.page_calls(), 2);
}

#[tokio::test]
async fn a_listing_reporting_zero_pages_completes_with_no_page_events() {
    let _ = env_logger::builder().is_test(true).try_init();

    let source = MockSource::new(Vec::new());
    let events = collect_events(source).await;

    assert!(page_numbers(&events).is_empty());
    assert!(matches!(events.last(), Some(FetchEvent::Completed { pages_total: 0 })));
}

#[tokio::test]
async fn a_total_changing_mid_fetch_keeps_the_original_total() {
    let _ = env_logger::builder().is_test(true).try_init();

    // From page 2 onwards the remote pretends there are 7 pages; the run keeps
    // the original 3
    let source = MockSource::new(scripted_pages(3, 1)).with_drifted_total(2, 7);
    let events = collect_events(source).await;

    assert_eq!(page_numbers(&events), vec![1, 2, 3]);
    for event in &events {
        if let FetchEvent::PageCompleted { total_pages, .. } = event {
            assert_eq!(*total_pages, 3);
        }
    }
    assert!(matches!(events.last(), Some(FetchEvent::Completed { pages_total: 3 })));
}

#[tokio::test]
async fn a_failed_category_lookup_does_not_block_the_fetch() {
    let _ = env_logger::builder().is_test(true).try_init();

    let source = MockSource::new(scripted_pages(2, 1)).with_failing_categories();
    let events = collect_events(source).await;

    assert!(!events.iter().any(|e| matches!(e, FetchEvent::CategoriesResolved(_))));
    assert!(matches!(events.last(), Some(FetchEvent::Completed { .. })));
}

#[tokio::test]
async fn a_provider_runs_the_whole_pipeline_and_caches_the_result() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();

    let source = MockSource::new(scripted_pages(3, 2))
        .with_categories(vec![Category { id: 5, name: "Festival".to_string() }]);
    let mut provider = Provider::new(source, &test_config(dir.path()));
    assert!(!provider.load_cached());

    let mut receiver = provider.start_fetch().unwrap();
    while let Some(event) = receiver.recv().await {
        provider.apply(event);
    }

    assert!(!provider.fetch_in_progress());
    assert_eq!(provider.model().snapshot().len(), 6);
    assert_eq!(provider.model().snapshot().pages_fetched(), 3);
    assert!(provider.model().snapshot().fetched_at().is_some());
    assert_eq!(provider.categories().display_name(5), "Festival");

    // The completed snapshot must now be restorable from the cache
    let restored = provider.cache().load().unwrap();
    assert_eq!(restored, *provider.model().snapshot());

    // And the filtered view is exportable
    let destination = dir.path().join("filtered.xlsx");
    provider.export_filtered(&destination).unwrap();
    assert!(destination.exists());
}

#[tokio::test]
async fn a_failed_fetch_leaves_the_cached_snapshot_intact() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();

    // First session: a successful fetch fills the cache
    let source = MockSource::new(vec![vec![
        event(1, "Cached event", date(2026, 2, 1), vec![5]),
    ]]);
    let mut provider = Provider::new(source, &test_config(dir.path()));
    let mut receiver = provider.start_fetch().unwrap();
    while let Some(ev) = receiver.recv().await {
        provider.apply(ev);
    }
    let cached = provider.cache().load().unwrap();

    // Second session: the remote is down from page 1
    let source = MockSource::new(scripted_pages(5, 1)).failing_from_page(1);
    let mut provider = Provider::new(source, &test_config(dir.path()));
    assert!(provider.load_cached());

    let mut receiver = provider.start_fetch().unwrap();
    while let Some(ev) = receiver.recv().await {
        provider.apply(ev);
    }

    // The previously loaded rows are still there and the cache file untouched
    assert_eq!(provider.model().snapshot().len(), 1);
    assert_eq!(provider.cache().load().unwrap(), cached);
    match provider.last_outcome() {
        Some(event_pantry::provider::FetchOutcome::Failed { pages_done, .. }) => {
            assert_eq!(*pages_done, 0)
        }
        other => panic!("expected a failed outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn starting_a_fetch_while_one_runs_is_rejected() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();

    let source = MockSource::new(scripted_pages(2, 1));
    let mut provider = Provider::new(source, &test_config(dir.path()));

    let mut receiver = provider.start_fetch().unwrap();
    match provider.start_fetch() {
        Err(Error::FetchInProgress) => {}
        other => panic!("expected FetchInProgress, got {:?}", other.map(|_| ())),
    }

    while let Some(ev) = receiver.recv().await {
        provider.apply(ev);
    }
    assert!(!provider.fetch_in_progress());
}
