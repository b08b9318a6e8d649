use crate::error::ProbeError;
use crate::health::Probe;
use futures_util::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::time::Duration;

type PingFn = Box<dyn Fn() -> BoxFuture<'static, Result<(), ProbeError>> + Send + Sync>;

/// Probe around an arbitrary async check, for in-process dependencies.
pub struct DependencyProbe {
    name: String,
    timeout: Duration,
    ping_fn: PingFn,
}

impl DependencyProbe {
    pub fn new<F, Fut>(name: impl Into<String>, timeout: Duration, ping_fn: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            timeout,
            ping_fn: Box::new(move || ping_fn().boxed()),
        }
    }
}

#[async_trait::async_trait]
impl Probe for DependencyProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn ping(&self) -> Result<(), ProbeError> {
        (self.ping_fn)().await
    }
}
