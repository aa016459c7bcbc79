use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::sources::FetchError;

/// Identifies one run of a poll. Generations increase monotonically per poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    pub generation: u64,
}

pub type ErrorHook = Arc<dyn Fn(&FetchError) + Send + Sync>;

/// Requests an immediate cycle from a running poll.
#[derive(Debug, Clone)]
pub struct PollTrigger {
    notify: Arc<Notify>,
}

impl PollTrigger {
    pub fn fire(&self) {
        self.notify.notify_one();
    }
}

/// A repeating timer driving one poll. Dropping the handle cancels it.
#[derive(Debug)]
pub struct PollHandle {
    name: &'static str,
    trigger: PollTrigger,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs a cycle now, without waiting for the next tick. The regular
    /// schedule is unaffected.
    #[cfg(test)]
    pub fn trigger(&self) {
        self.trigger.fire();
    }

    pub fn trigger_handle(&self) -> PollTrigger {
        self.trigger.clone()
    }

    /// Stops the timer and aborts any cycle still in flight.
    pub fn cancel(&self) {
        self.task.abort();
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        debug!(poll = self.name(), "Stopping poll");
        self.cancel();
    }
}

/// Starts a poll that calls `fetch` every `period`, the first time right away.
///
/// Each cycle runs as its own task, so a slow fetch never delays the timer
/// and cycles may overlap; `on_success` receives the [`Cycle`] so callers can
/// discard results older than what they already hold. A failed fetch skips
/// the cycle. An error or panic inside `on_success` is logged and the timer
/// keeps going. There is no backoff.
pub fn start_polling<T, F, Fut, S, SFut>(
    name: &'static str,
    period: Duration,
    fetch: F,
    on_success: S,
    on_error: Option<ErrorHook>,
) -> PollHandle
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    S: Fn(Cycle, T) -> SFut + Send + Sync + 'static,
    SFut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let notify = Arc::new(Notify::new());
    let on_success = Arc::new(on_success);

    let task = tokio::spawn({
        let notify = notify.clone();
        async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut in_flight = JoinSet::new();
            let mut generation = 0u64;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = notify.notified() => {
                        debug!(poll = name, "triggered");
                    }
                }

                while let Some(finished) = in_flight.try_join_next() {
                    if let Err(e) = finished {
                        if e.is_panic() {
                            warn!(poll = name, "cycle panicked");
                        }
                    }
                }

                generation += 1;
                let cycle = Cycle { generation };
                let fetched = fetch();
                let on_success = on_success.clone();
                let on_error = on_error.clone();

                in_flight.spawn(async move {
                    match fetched.await {
                        Ok(value) => {
                            if let Err(e) = on_success(cycle, value).await {
                                warn!(poll = name, generation, "Discarding cycle result: {e:#}");
                            }
                        }
                        Err(FetchError::NoPosition) => {
                            debug!(poll = name, generation, "Skipping cycle, no position yet");
                        }
                        Err(e) => {
                            warn!(poll = name, generation, "Fetch error: {e}");
                            if let Some(hook) = &on_error {
                                hook(&e);
                            }
                        }
                    }
                });
            }
        }
    });

    PollHandle {
        name,
        trigger: PollTrigger { notify },
        task,
    }
}
