use super::request::{Delivery, ReplySlot};
use super::stats::BatchStats;
use crate::classifier::Classification;
use crate::error::ClassifyError;
use std::sync::Arc;
use tracing::warn;

/// Hands a flushed batch's outcome back to the callers that supplied it.
#[derive(Debug, Clone)]
pub(crate) struct ResultRouter {
    stats: Arc<BatchStats>,
}

impl ResultRouter {
    pub(crate) fn new(stats: Arc<BatchStats>) -> Self {
        Self { stats }
    }

    /// Deliver `outputs[i]` to `slots[i]`, or the failure to every slot.
    ///
    /// On success, callers must have checked that both sides have the same length.
    pub(crate) fn route(
        &self,
        slots: Vec<ReplySlot>,
        outcome: std::result::Result<Vec<Classification>, ClassifyError>,
    ) {
        match outcome {
            Ok(outputs) => {
                debug_assert_eq!(slots.len(), outputs.len());
                for (slot, output) in slots.into_iter().zip(outputs) {
                    self.deliver(slot, Ok(output));
                }
            }
            Err(err) => {
                warn!(batch_size = slots.len(), error = %err, "classification failed, failing batch");
                for slot in slots {
                    self.deliver(slot, Err(err.clone()));
                }
            }
        }
    }

    fn deliver(&self, slot: ReplySlot, delivery: Delivery) {
        let ReplySlot { tx, trace } = slot;
        // A closed receiver means the caller stopped waiting.
        if tx.send(delivery).is_err() {
            self.stats.record_abandoned();
            trace.debug("caller gone, result dropped");
        } else {
            trace.debug("routed");
        }
    }
}
