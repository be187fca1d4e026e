//! One collection cycle.

use super::gate::IntakeReceiver;
use super::request::PendingRequest;
use crate::config::BatchConfig;
use tokio::time::{sleep_until, Instant};

/// What one cycle gathered.
#[derive(Debug)]
pub(crate) struct Collected {
    pub(crate) requests: Vec<PendingRequest>,
    /// Every producer is gone; no further cycle can collect anything.
    pub(crate) closed: bool,
}

/// Gather up to `max_batch_size` requests, stopping at the cycle deadline.
///
/// The deadline is armed once, at cycle start, and is not pushed back by
/// arrivals. If it has already passed when an item is also ready, the
/// deadline wins.
pub(crate) async fn collect_batch(intake: &mut IntakeReceiver, config: &BatchConfig) -> Collected {
    let mut requests = Vec::with_capacity(config.max_batch_size);
    let deadline = sleep_until(Instant::now() + config.max_wait_time);
    tokio::pin!(deadline);

    while requests.len() < config.max_batch_size {
        tokio::select! {
            biased;
            () = &mut deadline => break,
            next = intake.recv() => match next {
                Some(request) => {
                    request.trace().debug("received from intake queue");
                    requests.push(request);
                }
                None => {
                    return Collected {
                        requests,
                        closed: true,
                    }
                }
            },
        }
    }

    Collected {
        requests,
        closed: false,
    }
}
