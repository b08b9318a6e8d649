//! Wall-clock measurement around an orchestration call

use std::future::Future;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }
}

/// Runs `operation` to completion and returns its output with the time it took.
pub async fn measure<F>(operation: F) -> (F::Output, Duration)
where
    F: Future,
{
    let stopwatch = Stopwatch::start();
    let output = operation.await;
    (output, stopwatch.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_measure_includes_awaited_time() {
        let (value, elapsed) = measure(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            7
        })
        .await;

        assert_eq!(value, 7);
        assert!(elapsed >= Duration::from_millis(50));
    }

    #[test]
    fn test_stopwatch_is_monotonic() {
        let stopwatch = Stopwatch::start();
        let first = stopwatch.elapsed();
        let second = stopwatch.elapsed();
        assert!(second >= first);
        assert!(stopwatch.elapsed_ms() >= first.as_millis());
    }
}
