use super::request::{PendingRequest, ResultHandle};
use crate::classifier::Classification;
use crate::trace::TraceContext;
use crate::{Error, Result};
use tokio::sync::{mpsc, oneshot};

pub(crate) type IntakeSender = mpsc::UnboundedSender<PendingRequest>;

/// Consumer half of the intake queue; owned by exactly one [`super::BatchAggregator`].
pub type IntakeReceiver = mpsc::UnboundedReceiver<PendingRequest>;

/// Create an intake queue: the gate producers submit through, and the receiver
/// to hand to a [`super::BatchAggregator`].
pub fn intake_queue() -> (RequestGate, IntakeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RequestGate { intake: tx }, rx)
}

/// Producer-side entry point to the batcher.
///
/// Cheap to clone; every clone feeds the same aggregator. The aggregator stops
/// once all clones are dropped.
#[derive(Debug, Clone)]
pub struct RequestGate {
    intake: IntakeSender,
}

impl RequestGate {
    /// Queue `text` for classification without waiting for the result.
    ///
    /// Fails only if the aggregator is gone.
    pub fn enqueue(&self, text: impl Into<String>, trace: TraceContext) -> Result<ResultHandle> {
        let (tx, rx) = oneshot::channel();
        trace.debug("wait to put");
        self.intake
            .send(PendingRequest::new(text.into(), tx, trace.clone()))
            .map_err(|_| Error::AggregatorClosed)?;
        trace.debug("put, wait to get");
        Ok(ResultHandle::new(rx, trace))
    }

    /// Queue `text` and wait for its classification.
    pub async fn submit(&self, text: impl Into<String>, trace: TraceContext) -> Result<Classification> {
        self.enqueue(text, trace)?.wait().await
    }

    /// Whether the aggregator has stopped accepting requests.
    pub fn is_closed(&self) -> bool {
        self.intake.is_closed()
    }
}
