//! Integration tests for debounced repagination.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use pressflow::{
    FixedHeightMeasurer, PaginateOptions, Pressflow, PublicationMetadata, Repaginator,
    TextMetricsMeasurer, Typography,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_debounce_runs_once_with_latest_input() {
    let runs = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&runs);
    let measurer = FixedHeightMeasurer::new(move |_: &str, _: f32, _: &Typography| {
        counter.set(counter.get() + 1);
        10.0
    });
    let mut repaginator = Repaginator::new(measurer, PaginateOptions::default()).unwrap();
    let metadata = PublicationMetadata::new("Review");

    let t0 = Instant::now();
    repaginator.request("<p>draft 1</p>", metadata.clone(), t0);
    repaginator.request("<p>draft 2</p>", metadata.clone(), t0 + ms(100));
    repaginator.request("<p>draft 3</p>", metadata.clone(), t0 + ms(200));

    for t in [0, 100, 200, 300, 500, 699] {
        assert!(repaginator.poll(t0 + ms(t)).is_none(), "ran early at {}ms", t);
    }
    assert_eq!(runs.get(), 0, "nothing measured before the deadline");

    let outcome = repaginator.poll(t0 + ms(700)).expect("run at 700ms");
    assert_eq!(outcome.generation, 2);
    let pages = outcome.result.unwrap().pages;
    assert!(pages[0].html.contains("draft 3"));
    assert!(!pages[0].html.contains("draft 1"));

    assert_eq!(repaginator.runs(), 1);
    assert_eq!(runs.get(), 1);
}

#[test]
fn test_separate_quiet_windows_run_separately() {
    let mut repaginator = Pressflow::new()
        .with_debounce(ms(500))
        .repaginator(TextMetricsMeasurer::new())
        .unwrap();
    let metadata = PublicationMetadata::new("Review");

    let t0 = Instant::now();
    repaginator.request("<p>first</p>", metadata.clone(), t0);
    assert!(repaginator.poll(t0 + ms(500)).is_some());

    repaginator.request("<p>second</p>", metadata, t0 + ms(900));
    assert!(repaginator.poll(t0 + ms(1300)).is_none());
    let outcome = repaginator.poll(t0 + ms(1400)).unwrap();
    assert_eq!(outcome.generation, 1);
    assert_eq!(repaginator.runs(), 2);
}

#[test]
fn test_measurer_cache_survives_between_runs() {
    let mut repaginator = Repaginator::new(TextMetricsMeasurer::new(), PaginateOptions::default())
        .unwrap()
        .with_debounce(Duration::ZERO);
    let metadata = PublicationMetadata::new("Review");
    let body = "<p>stable paragraph</p><p>another stable paragraph</p>";

    let now = Instant::now();
    repaginator.request(body, metadata.clone(), now);
    repaginator.poll(now).unwrap().result.unwrap();
    repaginator.request(format!("{}<p>new</p>", body), metadata, now);
    repaginator.poll(now).unwrap().result.unwrap();

    assert_eq!(repaginator.measurer().cache_hits(), 2);
}

#[test]
fn test_worker_delivers_latest_generation() {
    let mut worker = Pressflow::new()
        .with_debounce(ms(100))
        .spawn_worker(TextMetricsMeasurer::new())
        .unwrap();
    let metadata = PublicationMetadata::new("Review");

    for i in 0..5 {
        worker
            .request(format!("<p>edit {}</p>", i), metadata.clone())
            .unwrap();
    }

    let outcome = worker.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(outcome.generation, 4);
    assert!(outcome.result.unwrap().pages[0].html.contains("edit 4"));
    worker.shutdown().unwrap();
}
