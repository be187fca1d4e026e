//! Flush policy and result routing of the batch aggregator.

use ai_detect_rust::batch::{self, intake_queue, BatchAggregator};
use ai_detect_rust::classifier::{Classification, Classifier};
use ai_detect_rust::{BatchConfig, ClassifyError, Error, ErrorContext, TraceContext};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Records every call and labels each text after itself.
#[derive(Default)]
struct RecordingClassifier {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingClassifier {
    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Classifier for RecordingClassifier {
    fn classify(&self, texts: &[String]) -> ai_detect_rust::Result<Vec<Classification>> {
        self.calls.lock().unwrap().push(texts.to_vec());
        Ok(texts
            .iter()
            .map(|t| Classification::new(format!("label-{t}"), t.len() as f64))
            .collect())
    }
}

fn config(size: usize, wait_ms: u64) -> BatchConfig {
    BatchConfig::new()
        .with_max_batch_size(size)
        .with_max_wait_time(Duration::from_millis(wait_ms))
}

fn ctx() -> TraceContext {
    TraceContext::new("test-scan")
}

#[tokio::test(start_paused = true)]
async fn test_size_cap_flushes_before_deadline() {
    let classifier = Arc::new(RecordingClassifier::default());
    let (gate, aggregator) = batch::spawn(config(4, 50), classifier.clone()).unwrap();

    let start = Instant::now();
    let a = gate.enqueue("a", ctx()).unwrap();
    let b = gate.enqueue("b", ctx()).unwrap();
    let c = gate.enqueue("c", ctx()).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let d = gate.enqueue("d", ctx()).unwrap();

    let results = futures::future::try_join_all([a, b, c, d].map(|h| h.wait()))
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(classifier.calls(), vec![vec!["a", "b", "c", "d"]]);
    let labels: Vec<_> = results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["label-a", "label-b", "label-c", "label-d"]);
    assert!(elapsed >= Duration::from_millis(10));
    assert!(elapsed < Duration::from_millis(50), "flushed at {elapsed:?}");

    drop(gate);
    aggregator.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_partial_batch_waits_for_deadline() {
    let classifier = Arc::new(RecordingClassifier::default());
    let (gate, aggregator) = batch::spawn(config(4, 50), classifier.clone()).unwrap();

    let start = Instant::now();
    let x = gate.enqueue("x", ctx()).unwrap();
    let y = gate.enqueue("y", ctx()).unwrap();

    assert_eq!(x.await.unwrap().label, "label-x");
    assert_eq!(y.await.unwrap().label, "label-y");
    let elapsed = start.elapsed();

    assert_eq!(classifier.calls(), vec![vec!["x", "y"]]);
    assert!(elapsed >= Duration::from_millis(50), "flushed early at {elapsed:?}");
    assert!(elapsed < Duration::from_millis(100));

    drop(gate);
    aggregator.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_idle_cycles_never_call_classifier() {
    let classifier = Arc::new(RecordingClassifier::default());
    let (gate, aggregator) = batch::spawn(config(4, 50), classifier.clone()).unwrap();

    tokio::time::sleep(Duration::from_millis(175)).await;

    let snapshot = aggregator.snapshot();
    assert!(classifier.calls().is_empty());
    assert!(snapshot.cycles >= 3, "only {} cycles", snapshot.cycles);
    assert_eq!(snapshot.empty_cycles, snapshot.cycles);
    assert_eq!(snapshot.batches, 0);

    drop(gate);
    aggregator.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_slow_arrivals_flush_within_one_window() {
    let classifier = Arc::new(RecordingClassifier::default());
    let (gate, aggregator) = batch::spawn(config(4, 50), classifier.clone()).unwrap();

    let sent = Instant::now();
    assert_eq!(gate.submit("p", ctx()).await.unwrap().label, "label-p");
    assert!(sent.elapsed() <= Duration::from_millis(50));

    tokio::time::sleep(Duration::from_millis(70)).await;

    let sent = Instant::now();
    assert_eq!(gate.submit("q", ctx()).await.unwrap().label, "label-q");
    assert!(sent.elapsed() <= Duration::from_millis(50));

    assert_eq!(classifier.calls(), vec![vec!["p"], vec!["q"]]);

    drop(gate);
    aggregator.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_batches_never_exceed_max_size() {
    let classifier = Arc::new(RecordingClassifier::default());
    let (gate, aggregator) = batch::spawn(config(4, 50), classifier.clone()).unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| gate.enqueue(format!("t{i}"), ctx().tag("id", i)).unwrap())
        .collect();
    let results = futures::future::try_join_all(handles.into_iter().map(|h| h.wait()))
        .await
        .unwrap();

    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.label, format!("label-t{i}"));
    }
    let sizes: Vec<usize> = classifier.calls().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![4, 4, 2]);
    assert_eq!(aggregator.snapshot().largest_batch, 4);
    assert_eq!(aggregator.snapshot().items, 10);

    drop(gate);
    aggregator.join().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submitters_get_their_own_results() {
    let classifier = Arc::new(RecordingClassifier::default());
    let (gate, aggregator) = batch::spawn(config(8, 20), classifier.clone()).unwrap();

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let gate = gate.clone();
            tokio::spawn(async move {
                let text = format!("caller-{i}");
                let result = gate.submit(text.clone(), TraceContext::new_root()).await;
                (text, result)
            })
        })
        .collect();

    for task in tasks {
        let (text, result) = task.await.unwrap();
        let result = result.unwrap();
        assert_eq!(result.label, format!("label-{text}"));
        assert_eq!(result.score, text.len() as f64);
    }

    let calls = classifier.calls();
    assert!(calls.iter().all(|c| !c.is_empty() && c.len() <= 8));
    // Exactly one delivery per request: every text was classified once.
    let mut seen: Vec<String> = calls.into_iter().flatten().collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 64);
    assert_eq!(aggregator.snapshot().items, 64);

    drop(gate);
    aggregator.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_classifier_error_reaches_every_caller() {
    let classifier = Arc::new(
        |texts: &[String]| -> ai_detect_rust::Result<Vec<Classification>> {
            if texts.iter().any(|t| t == "boom") {
                return Err(Error::runtime_with_context(
                    "cuda device lost",
                    ErrorContext::new().with_source("test"),
                ));
            }
            Ok(texts.iter().map(|_| Classification::new("Human", 0.1)).collect())
        },
    );
    let (gate, aggregator) = batch::spawn(config(2, 50), classifier).unwrap();

    let ok_sibling = gate.enqueue("fine", ctx()).unwrap();
    let boom = gate.enqueue("boom", ctx()).unwrap();
    for handle in [ok_sibling, boom] {
        match handle.await {
            Err(Error::Classify(ClassifyError::Failed { message })) => {
                assert!(message.contains("cuda device lost"), "{message}");
            }
            other => panic!("expected classifier failure, got {other:?}"),
        }
    }

    // The aggregator keeps serving later batches.
    assert_eq!(gate.submit("after", ctx()).await.unwrap().label, "Human");
    assert_eq!(aggregator.snapshot().failed_batches, 1);

    drop(gate);
    aggregator.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_classifier_panic_is_delivered() {
    let classifier = Arc::new(
        |_texts: &[String]| -> ai_detect_rust::Result<Vec<Classification>> {
            panic!("model exploded")
        },
    );
    let (gate, aggregator) = batch::spawn(config(4, 50), classifier).unwrap();

    let err = gate.submit("anything", ctx()).await.unwrap_err();
    match err {
        Error::Classify(ClassifyError::Panicked { message }) => assert_eq!(message, "model exploded"),
        other => panic!("expected panic failure, got {other:?}"),
    }

    drop(gate);
    aggregator.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_output_length_mismatch_fails_batch() {
    let classifier = Arc::new(
        |_texts: &[String]| -> ai_detect_rust::Result<Vec<Classification>> {
            Ok(vec![Classification::new("AI", 0.9)])
        },
    );
    let (gate, aggregator) = batch::spawn(config(2, 50), classifier).unwrap();

    let a = gate.enqueue("a", ctx()).unwrap();
    let b = gate.enqueue("b", ctx()).unwrap();
    for handle in [a, b] {
        assert!(matches!(
            handle.await,
            Err(Error::Classify(ClassifyError::OutputMismatch {
                expected: 2,
                actual: 1
            }))
        ));
    }

    drop(gate);
    aggregator.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_closing_gate_flushes_leftovers_and_stops() {
    let classifier = Arc::new(RecordingClassifier::default());
    let (gate, aggregator) = batch::spawn(config(4, 50), classifier.clone()).unwrap();

    let start = Instant::now();
    let last = gate.enqueue("last", ctx()).unwrap();
    drop(gate);

    assert_eq!(last.await.unwrap().label, "label-last");
    aggregator.join().await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(50));
    assert_eq!(classifier.calls(), vec![vec!["last"]]);
}

#[tokio::test]
async fn test_unserved_request_reports_closed_aggregator() {
    let (gate, intake) = intake_queue();
    let aggregator = BatchAggregator::new(
        config(4, 50),
        Arc::new(RecordingClassifier::default()),
        intake,
    );

    let handle = gate.enqueue("never", ctx()).unwrap();
    drop(aggregator);

    assert!(matches!(handle.await, Err(Error::AggregatorClosed)));
    assert!(matches!(
        gate.enqueue("later", ctx()),
        Err(Error::AggregatorClosed)
    ));
}

#[tokio::test]
async fn test_spawn_rejects_invalid_config() {
    let result = batch::spawn(config(0, 50), Arc::new(RecordingClassifier::default()));
    assert!(matches!(result, Err(Error::Configuration { .. })));
}
