//! # ai-detect-rust
//!
//! 面向 AI 生成文本检测的微批处理分类运行时。
//!
//! Micro-batching runtime for a text-classification service.
//!
//! ## Overview
//!
//! Many callers each submit a short text and expect a `(label, score)`. Running
//! the model once per request wastes a GPU-bound classifier, so this crate
//! funnels concurrent requests through one aggregator that forms bounded,
//! time-boxed batches, calls the classifier once per batch, and routes every
//! output back to the caller that asked for it.
//!
//! ## Key Features
//!
//! - **Bounded batches**: never more than `max_batch_size` texts per call
//! - **Latency cap**: one deadline per collection cycle, never reset by arrivals
//! - **Positional routing**: output `i` of a batch always reaches the caller of input `i`
//! - **Typed failures**: classifier errors and panics reach every waiting caller
//! - **Correlated tracing**: branchable [`TraceContext`] per request and segment
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`batch`] | Request gate, aggregator loop, result routing, counters |
//! | [`classifier`] | The classification capability and its remote backend |
//! | [`trace`] | Per-request diagnostic context |
//! | [`segment`] | Fixed-length document segmentation |
//! | [`config`] | Batch and server configuration |
//! | [`server`] | `POST /predit/text` HTTP surface (feature `server`) |

pub mod batch;
pub mod classifier;
pub mod config;
pub mod segment;
pub mod trace;

#[cfg(feature = "server")]
pub mod server;

pub use batch::{AggregatorHandle, BatchAggregator, RequestGate, ResultHandle};
pub use classifier::{Classification, Classifier};
pub use config::{BatchConfig, ServerConfig};
pub use trace::TraceContext;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{ClassifyError, Error, ErrorContext};
