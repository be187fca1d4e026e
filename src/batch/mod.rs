//! 微批处理模块：将并发到达的分类请求聚合为有界批次。
//!
//! # Micro-batching Module
//!
//! Many callers classify short texts concurrently; the model is far cheaper
//! per text when called on several at once. This module turns independently
//! arriving requests into bounded, time-boxed batches, makes one classifier
//! call per batch, and routes each output back to the caller that supplied
//! the input.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RequestGate`] | Producer entry point: `enqueue` / `submit` |
//! | [`ResultHandle`] | Single-use handle resolving to one result |
//! | [`BatchAggregator`] | The single consumer loop over the intake queue |
//! | [`AggregatorHandle`] | Running aggregator task plus its [`BatchStats`] |
//!
//! ## Flush policy
//!
//! Every cycle arms one deadline (`max_wait_time`) at its start. The batch is
//! flushed as soon as it holds `max_batch_size` requests or the deadline
//! fires, whichever comes first. Arrivals never extend the deadline, so the
//! first request of a cycle waits at most `max_wait_time` before its batch is
//! dispatched. A cycle that collects nothing makes no classifier call.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ai_detect_rust::batch;
//! use ai_detect_rust::classifier::Classification;
//! use ai_detect_rust::{BatchConfig, TraceContext};
//! use std::sync::Arc;
//!
//! # async fn demo() -> ai_detect_rust::Result<()> {
//! let classifier = Arc::new(|texts: &[String]| -> ai_detect_rust::Result<Vec<Classification>> {
//!     Ok(texts.iter().map(|_| Classification::new("Human", 0.5)).collect())
//! });
//! let (gate, aggregator) = batch::spawn(BatchConfig::new(), classifier)?;
//!
//! let result = gate.submit("some text", TraceContext::new_root()).await?;
//! println!("{} {}", result.label, result.score);
//!
//! drop(gate);
//! aggregator.join().await?;
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod collector;
mod gate;
mod request;
mod router;
mod stats;

pub use aggregator::{AggregatorHandle, BatchAggregator};
pub use gate::{intake_queue, IntakeReceiver, RequestGate};
pub use request::{PendingRequest, ResultHandle};
pub use stats::{BatchStats, BatchStatsSnapshot};

use crate::classifier::Classifier;
use crate::config::BatchConfig;
use crate::Result;
use std::sync::Arc;

/// Validate `config`, wire an intake queue to a new aggregator and spawn it
/// on the current Tokio runtime.
pub fn spawn(
    config: BatchConfig,
    classifier: Arc<dyn Classifier>,
) -> Result<(RequestGate, AggregatorHandle)> {
    config.validate()?;
    let (gate, intake) = intake_queue();
    let handle = BatchAggregator::new(config, classifier, intake).spawn();
    Ok((gate, handle))
}
