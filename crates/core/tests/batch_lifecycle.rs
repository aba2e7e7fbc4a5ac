//! Batch lifecycle integration tests.
//!
//! These tests drive the orchestrator end to end:
//! - Real image conversions into `<source>/Converted`
//! - Failure isolation and terminal outcomes
//! - Cooperative cancellation
//! - Progress ordering and the concurrency bound

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use prism_core::{
    batch::{BatchError, BatchOrchestrator, BatchRequest, ConversionOutcome, OrchestratorConfig, RunOutcome},
    media::MediaCategory,
    output::{OutputPolicy, CONVERTED_DIR_NAME},
    progress::BatchEvent,
    testing::{fixtures, MockTranscoder},
    ImageTranscoder, JobQueue,
};

/// Test helper wrapping an orchestrator over the mock transcoder.
struct TestHarness {
    orchestrator: BatchOrchestrator<MockTranscoder>,
    transcoder: MockTranscoder,
    source_dir: TempDir,
}

impl TestHarness {
    async fn new(workers: usize) -> Self {
        let source_dir = TempDir::new().expect("Failed to create source dir");
        let transcoder = MockTranscoder::new();
        transcoder
            .set_conversion_duration(Duration::from_millis(10))
            .await;

        let orchestrator = BatchOrchestrator::new(
            OrchestratorConfig::default().with_max_concurrency(workers),
            transcoder.clone(),
        );

        Self {
            orchestrator,
            transcoder,
            source_dir,
        }
    }

    fn create_source_files(&self, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = self.source_dir.path().join(format!("file{}.png", i));
                std::fs::write(&path, b"test content").expect("Failed to create source file");
                path
            })
            .collect()
    }

    fn request(&self, paths: Vec<PathBuf>) -> BatchRequest {
        BatchRequest::new(paths, MediaCategory::Image, "JPG")
    }
}

/// Converts three real PNG fixtures with `tag` and checks that exactly
/// `a.<ext>`, `b.<ext>` and `c.<ext>` land in `Converted/`.
async fn convert_fixtures_next_to_sources(tag: &str, ext: &str) {
    let dir = TempDir::new().unwrap();
    let sources = vec![
        fixtures::png(dir.path(), "a.png", 16, 16),
        fixtures::png(dir.path(), "b.png", 32, 8),
        fixtures::png(dir.path(), "c.png", 8, 32),
    ];
    let orchestrator = BatchOrchestrator::new(
        OrchestratorConfig::default().with_max_concurrency(1),
        ImageTranscoder::with_defaults(),
    );

    let handle = orchestrator
        .submit(BatchRequest::new(sources, MediaCategory::Image, tag))
        .unwrap();
    let summary = handle.wait().await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Success);
    assert_eq!(summary.converted, 3);
    let converted = dir.path().join(CONVERTED_DIR_NAME);
    for base in ["a", "b", "c"] {
        let output = converted.join(format!("{base}.{ext}"));
        assert!(output.exists(), "missing {}", output.display());
        let img = image::open(&output).unwrap();
        assert!(img.width() > 0);
    }
    // Only final outputs remain, no staging leftovers
    assert_eq!(std::fs::read_dir(&converted).unwrap().count(), 3);
}

#[tokio::test]
async fn test_real_images_converted_next_to_sources() {
    convert_fixtures_next_to_sources("JPG", "jpeg").await;
}

#[tokio::test]
async fn test_real_images_converted_to_png_next_to_sources() {
    convert_fixtures_next_to_sources("PNG", "png").await;
}

#[cfg(unix)]
#[tokio::test]
async fn test_outputs_are_not_private_to_owner() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let sources = vec![fixtures::png(dir.path(), "a.png", 4, 4)];
    let orchestrator = BatchOrchestrator::new(
        OrchestratorConfig::default(),
        ImageTranscoder::with_defaults(),
    );

    orchestrator
        .submit(BatchRequest::new(sources, MediaCategory::Image, "PNG"))
        .unwrap()
        .wait()
        .await
        .unwrap();

    let converted = dir.path().join(CONVERTED_DIR_NAME);
    let plain = converted.join("plain.txt");
    std::fs::write(&plain, b"x").unwrap();
    let mode = |p: &std::path::Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(&converted.join("a.png")), mode(&plain));
}

#[tokio::test]
async fn test_real_images_into_explicit_folder() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let sources = vec![
        fixtures::png(dir.path(), "a.png", 4, 4),
        fixtures::corrupt(dir.path(), "broken.png"),
    ];
    let orchestrator = BatchOrchestrator::new(
        OrchestratorConfig::default().with_max_concurrency(2),
        ImageTranscoder::with_defaults(),
    );

    let summary = orchestrator
        .submit(
            BatchRequest::new(sources, MediaCategory::Image, "BMP")
                .with_output_policy(OutputPolicy::Explicit(out.path().to_path_buf())),
        )
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.outcome, RunOutcome::CompletedWithErrors);
    assert!(out.path().join("a.bmp").exists());
    assert!(!out.path().join("broken.bmp").exists());
    assert!(matches!(
        &summary.items[1].outcome,
        ConversionOutcome::Failed { kind, .. } if kind == "decode"
    ));
}

#[tokio::test]
async fn test_source_deleted_after_enqueue() {
    let harness = TestHarness::new(2).await;
    let paths = harness.create_source_files(3);
    let mut queue = JobQueue::new();
    assert_eq!(queue.add_many(MediaCategory::Image, paths.clone()), 3);

    std::fs::remove_file(&paths[1]).unwrap();

    let summary = harness
        .orchestrator
        .submit_queue(&queue, MediaCategory::Image, "PNG", OutputPolicy::SameAsSource)
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.outcome, RunOutcome::CompletedWithErrors);
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.failed, 1);
    assert!(matches!(
        &summary.items[1].outcome,
        ConversionOutcome::Failed { kind, .. } if kind == "not_found"
    ));
    assert_eq!(harness.transcoder.conversion_count().await, 2);
}

#[tokio::test]
async fn test_all_items_failing() {
    let harness = TestHarness::new(2).await;
    let paths = harness.create_source_files(3);
    for path in &paths {
        harness.transcoder.fail_on(path, "unreadable").await;
    }

    let handle = harness.orchestrator.submit(harness.request(paths)).unwrap();
    let progress = handle.subscribe();
    let summary = handle.wait().await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::CompletedWithErrors);
    assert_eq!(summary.failed, 3);
    let last = progress.borrow().clone();
    assert_eq!(last.failures.len(), 3);
    assert_eq!(last.status, "Completed with 3 error(s)");
}

#[tokio::test]
async fn test_cancel_mid_run() {
    let harness = TestHarness::new(1).await;
    harness
        .transcoder
        .set_conversion_duration(Duration::from_millis(50))
        .await;
    let paths = harness.create_source_files(5);

    let handle = harness.orchestrator.submit(harness.request(paths)).unwrap();
    let mut progress = handle.subscribe();
    while progress.borrow_and_update().completed < 1 {
        progress.changed().await.unwrap();
    }
    handle.cancel();
    assert!(handle.is_cancelled());

    let summary = handle.wait().await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.items.len(), 5);
    assert!(summary.converted >= 1);
    assert!(summary.converted <= 2);
    assert_eq!(summary.converted + summary.skipped, 5);
    assert!(harness.transcoder.conversion_count().await <= 2);

    let last = progress.borrow().clone();
    assert_eq!(last.terminal, Some(RunOutcome::Cancelled));
    assert_eq!(last.completed, 0);
    assert_eq!(last.status, "Cancelled");
}

#[tokio::test]
async fn test_cancel_before_any_item_starts() {
    let harness = TestHarness::new(2).await;
    let paths = harness.create_source_files(4);
    let token = tokio_util::sync::CancellationToken::new();
    token.cancel();

    let summary = harness
        .orchestrator
        .submit(harness.request(paths).with_cancellation(token))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert_eq!(summary.skipped, 4);
    assert!(summary
        .items
        .iter()
        .all(|r| matches!(&r.outcome, ConversionOutcome::Skipped { reason } if reason == "cancelled")));
    assert_eq!(harness.transcoder.conversion_count().await, 0);
}

#[tokio::test]
async fn test_events_are_monotonic() {
    let harness = TestHarness::new(4).await;
    let paths = harness.create_source_files(12);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = harness
        .orchestrator
        .submit(harness.request(paths).with_events(tx))
        .unwrap();
    let run_id = handle.id();
    handle.wait().await.unwrap();

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(BatchEvent::Started { total: 12, .. })));
    assert!(matches!(
        events.last(),
        Some(BatchEvent::Finished { summary }) if summary.outcome == RunOutcome::Success
    ));

    let counts: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            BatchEvent::ItemFinished {
                run_id: id,
                completed,
                total,
                ..
            } => {
                assert_eq!(*id, run_id);
                assert!(completed <= total);
                Some(*completed)
            }
            _ => None,
        })
        .collect();
    assert_eq!(counts, (1..=12).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_concurrency_bound_holds() {
    let harness = TestHarness::new(3).await;
    harness
        .transcoder
        .set_conversion_duration(Duration::from_millis(20))
        .await;
    let paths = harness.create_source_files(10);

    let summary = harness
        .orchestrator
        .submit(harness.request(paths))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.outcome, RunOutcome::Success);
    assert!(harness.transcoder.max_in_flight() <= 3);
    assert!(harness.transcoder.max_in_flight() >= 1);
}

#[tokio::test]
async fn test_summary_preserves_input_order() {
    let harness = TestHarness::new(4).await;
    let paths = harness.create_source_files(8);

    let summary = harness
        .orchestrator
        .submit(harness.request(paths.clone()))
        .unwrap()
        .wait()
        .await
        .unwrap();

    for (index, report) in summary.items.iter().enumerate() {
        assert_eq!(report.index, index);
        assert_eq!(report.source, paths[index]);
    }
}

#[tokio::test]
async fn test_empty_batch() {
    let harness = TestHarness::new(2).await;
    let queue = JobQueue::new();

    let result = harness.orchestrator.submit_queue(
        &queue,
        MediaCategory::Image,
        "PNG",
        OutputPolicy::SameAsSource,
    );

    assert!(matches!(result, Err(BatchError::NothingToDo)));
}
