//! Units that travel through the intake queue and back.

use crate::classifier::Classification;
use crate::error::ClassifyError;
use crate::trace::TraceContext;
use crate::{Error, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::IntoFuture;
use tokio::sync::oneshot;

/// What the router writes into a request's private channel.
pub(crate) type Delivery = std::result::Result<Classification, ClassifyError>;

/// The write half of a request's result channel, plus its trace branch.
#[derive(Debug)]
pub(crate) struct ReplySlot {
    pub(crate) tx: oneshot::Sender<Delivery>,
    pub(crate) trace: TraceContext,
}

/// One text waiting to be batched.
#[derive(Debug)]
pub struct PendingRequest {
    text: String,
    reply: ReplySlot,
}

impl PendingRequest {
    pub(crate) fn new(text: String, tx: oneshot::Sender<Delivery>, trace: TraceContext) -> Self {
        Self {
            text,
            reply: ReplySlot { tx, trace },
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn trace(&self) -> &TraceContext {
        &self.reply.trace
    }

    pub(crate) fn into_parts(self) -> (String, ReplySlot) {
        (self.text, self.reply)
    }
}

/// The caller's side of one enqueued request.
///
/// Resolves exactly once: with the classification, with the batch's failure,
/// or with [`Error::AggregatorClosed`] if the request was dropped unserved.
/// Awaiting the handle directly is the same as calling [`ResultHandle::wait`].
#[derive(Debug)]
pub struct ResultHandle {
    rx: oneshot::Receiver<Delivery>,
    trace: TraceContext,
}

impl ResultHandle {
    pub(crate) fn new(rx: oneshot::Receiver<Delivery>, trace: TraceContext) -> Self {
        Self { rx, trace }
    }

    pub fn trace(&self) -> &TraceContext {
        &self.trace
    }

    pub async fn wait(self) -> Result<Classification> {
        let delivery = self.rx.await;
        self.trace.debug("got");
        match delivery {
            Ok(Ok(classification)) => Ok(classification),
            Ok(Err(e)) => Err(Error::Classify(e)),
            Err(_) => Err(Error::AggregatorClosed),
        }
    }
}

impl IntoFuture for ResultHandle {
    type Output = Result<Classification>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        self.wait().boxed()
    }
}
