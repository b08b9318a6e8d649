//! The probe capability and its bounded check

use crate::error::ProbeError;
use crate::health::Verdict;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A bounded-time check against one dependency.
///
/// Implementors provide the raw `ping`; the orchestrator only ever calls
/// [`Probe::check`], which enforces `timeout()` and folds every failure,
/// panics included, into an unhealthy [`Verdict`].
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    fn name(&self) -> &str;

    fn timeout(&self) -> Duration;

    async fn ping(&self) -> Result<(), ProbeError>;

    async fn check(&self) -> Verdict {
        let name = self.name();
        let start = Instant::now();

        let outcome = tokio::time::timeout(
            self.timeout(),
            AssertUnwindSafe(self.ping()).catch_unwind(),
        )
        .await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(ProbeError::Unexpected(panic_message(panic))),
            // the pending ping is dropped here; nothing waits on it any more
            Err(_) => Err(ProbeError::Timeout),
        };

        let elapsed = start.elapsed();
        match result {
            Ok(()) => {
                debug!("Probe '{}' passed in {:?}", name, elapsed);
                Verdict::healthy(name)
            }
            Err(err) => {
                warn!("Probe '{}' failed in {:?}: {}", name, elapsed, err);
                Verdict::unhealthy(name, failure_message(name, &err))
            }
        }
    }
}

pub fn failure_message(name: &str, err: &ProbeError) -> String {
    format!("{} {}", name, err)
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "probe panicked".to_string()
    }
}
