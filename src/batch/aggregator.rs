use super::collector::{collect_batch, Collected};
use super::gate::IntakeReceiver;
use super::request::PendingRequest;
use super::router::ResultRouter;
use super::stats::{BatchStats, BatchStatsSnapshot};
use crate::classifier::{Classification, Classifier};
use crate::config::BatchConfig;
use crate::error::ClassifyError;
use crate::{Error, ErrorContext, Result};
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The single consumer of an intake queue.
///
/// Each cycle collects up to `max_batch_size` requests within one
/// `max_wait_time` window, makes one classifier call for them, and routes
/// the outputs back by position. Only one classifier call is ever in flight.
pub struct BatchAggregator {
    config: BatchConfig,
    classifier: Arc<dyn Classifier>,
    intake: IntakeReceiver,
    router: ResultRouter,
    stats: Arc<BatchStats>,
}

impl BatchAggregator {
    pub fn new(config: BatchConfig, classifier: Arc<dyn Classifier>, intake: IntakeReceiver) -> Self {
        let stats = Arc::new(BatchStats::new());
        Self {
            config,
            classifier,
            intake,
            router: ResultRouter::new(Arc::clone(&stats)),
            stats,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn stats(&self) -> Arc<BatchStats> {
        Arc::clone(&self.stats)
    }

    /// Run on the current runtime until every [`super::RequestGate`] is dropped.
    pub fn spawn(self) -> AggregatorHandle {
        let stats = self.stats();
        let join = tokio::spawn(self.run());
        AggregatorHandle { join, stats }
    }

    /// Drive collection cycles until the intake queue closes.
    ///
    /// Requests still queued at close are flushed before returning.
    pub async fn run(mut self) {
        info!(
            batch_timeout_ms = self.config.max_wait_time.as_millis() as u64,
            batch_size_max = self.config.max_batch_size,
            "batch aggregator started"
        );
        loop {
            let Collected { requests, closed } = collect_batch(&mut self.intake, &self.config).await;
            self.stats.record_cycle(requests.len());
            if !requests.is_empty() {
                self.flush(requests).await;
            }
            if closed {
                info!("intake queue closed, batch aggregator stopping");
                return;
            }
        }
    }

    async fn flush(&self, requests: Vec<PendingRequest>) {
        let batch_size = requests.len();
        let (texts, slots): (Vec<String>, Vec<_>) =
            requests.into_iter().map(PendingRequest::into_parts).unzip();

        info!(batch_size, "flushing batch");
        debug!("inferencing...");
        let started = Instant::now();
        let outcome = self.classify(texts).await;
        debug!(
            batch_size,
            duration_ms = started.elapsed().as_millis() as u64,
            ok = outcome.is_ok(),
            "inferencing...done"
        );

        self.stats.record_batch(batch_size);
        if outcome.is_err() {
            self.stats.record_failure();
        }
        self.router.route(slots, outcome);
    }

    /// One blocking classifier call, with every failure mode made explicit.
    async fn classify(
        &self,
        texts: Vec<String>,
    ) -> std::result::Result<Vec<Classification>, ClassifyError> {
        let expected = texts.len();
        let classifier = Arc::clone(&self.classifier);
        let outputs = match tokio::task::spawn_blocking(move || classifier.classify(&texts)).await {
            Ok(Ok(outputs)) => outputs,
            Ok(Err(e)) => {
                return Err(ClassifyError::Failed {
                    message: e.to_string(),
                })
            }
            Err(join) if join.is_panic() => {
                return Err(ClassifyError::Panicked {
                    message: panic_message(join.into_panic()),
                })
            }
            Err(join) => {
                return Err(ClassifyError::Failed {
                    message: join.to_string(),
                })
            }
        };
        if outputs.len() != expected {
            return Err(ClassifyError::OutputMismatch {
                expected,
                actual: outputs.len(),
            });
        }
        Ok(outputs)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A running aggregator task.
#[derive(Debug)]
pub struct AggregatorHandle {
    join: JoinHandle<()>,
    stats: Arc<BatchStats>,
}

impl AggregatorHandle {
    pub fn stats(&self) -> Arc<BatchStats> {
        Arc::clone(&self.stats)
    }

    pub fn snapshot(&self) -> BatchStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the aggregator to stop (after all gates are dropped).
    pub async fn join(self) -> Result<()> {
        self.join.await.map_err(|e| {
            Error::runtime_with_context(
                "batch aggregator task failed",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("batch_aggregator"),
            )
        })
    }

    pub fn abort(&self) {
        self.join.abort();
    }
}
