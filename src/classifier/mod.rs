//! Classification capability consumed by the batch aggregator.
//!
//! The aggregator treats the model as an opaque, blocking function from an
//! ordered list of texts to an equally long, equally ordered list of
//! [`Classification`]s. It is invoked at most once at a time, on Tokio's
//! blocking pool, so implementations may hold a GPU or do synchronous I/O.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Classifier`] | The capability trait; also implemented for plain closures |
//! | [`Classification`] | One `(label, score)` output |
//! | [`RemoteClassifier`] | Forwards batches to an HTTP inference server (`remote` feature) |

#[cfg(feature = "remote")]
mod remote;

#[cfg(feature = "remote")]
pub use remote::{RemoteClassifier, RemoteClassifierConfig};

use crate::Result;
use serde::{Deserialize, Serialize};

/// One classifier output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Batch text classifier.
///
/// `classify` must return exactly one output per input, in input order. A
/// length mismatch is reported to every caller of the batch as a failure.
pub trait Classifier: Send + Sync {
    fn classify(&self, texts: &[String]) -> Result<Vec<Classification>>;
}

impl<F> Classifier for F
where
    F: Fn(&[String]) -> Result<Vec<Classification>> + Send + Sync,
{
    fn classify(&self, texts: &[String]) -> Result<Vec<Classification>> {
        self(texts)
    }
}
