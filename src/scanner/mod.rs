//! Access to the scan engine.
//!
//! The engine is reached through the [`ScanExecutor`] trait. It is treated as
//! a shared resource that may not tolerate concurrent invocations, so every
//! call goes through a [`ScanPool`] which bounds how many run at once and
//! makes sure none of them outlives its timeout.
use crate::compiler::CanonicalArgs;
use crate::errors::EngineFault;
use crate::findings::RawFindings;
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time;

mod nmap;
mod xml;

pub use nmap::NmapExecutor;
pub use xml::parse_report;

/// Default time a single engine invocation may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Extra time given to an executor to honour its own timeout before the pool
/// gives up on it.
const TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Runs one compiled scan against one target.
///
/// Implementations must stop within `timeout` and return
/// [`EngineFault::Timeout`] when they cannot. A target the engine produced
/// no record for is not a fault: return findings without that host.
#[async_trait]
pub trait ScanExecutor: Send + Sync {
    async fn execute(
        &self,
        target: &str,
        args: &CanonicalArgs,
        timeout: Duration,
    ) -> Result<RawFindings, EngineFault>;
}

#[async_trait]
impl<E: ScanExecutor + ?Sized> ScanExecutor for Arc<E> {
    async fn execute(
        &self,
        target: &str,
        args: &CanonicalArgs,
        timeout: Duration,
    ) -> Result<RawFindings, EngineFault> {
        (**self).execute(target, args, timeout).await
    }
}

/// Serializes engine access.
///
/// `workers` invocations may be in flight at once (at least one); everything
/// else waits for a permit. Waiting does not count against the timeout.
#[derive(Debug)]
pub struct ScanPool<E> {
    executor: E,
    permits: Semaphore,
    workers: usize,
    timeout: Duration,
}

impl<E: ScanExecutor> ScanPool<E> {
    pub fn new(executor: E, workers: usize, timeout: Duration) -> Self {
        let workers = workers.max(1);
        Self {
            executor,
            permits: Semaphore::new(workers),
            workers,
            timeout,
        }
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Waits for a free worker, then runs the scan. Never retries.
    pub async fn run(&self, target: &str, args: &CanonicalArgs) -> Result<RawFindings, EngineFault> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| EngineFault::InvocationError(e.to_string()))?;

        debug!("Worker acquired, scanning {} with: {}", target, args);

        match time::timeout(
            self.timeout.saturating_add(TIMEOUT_GRACE),
            self.executor.execute(target, args, self.timeout),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(EngineFault::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ScanExecutor, ScanPool};
    use crate::compiler::{CanonicalArgs, ScanConfigCompiler};
    use crate::errors::EngineFault;
    use crate::findings::RawFindings;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Stalled;

    struct Immediate;

    #[async_trait]
    impl ScanExecutor for Immediate {
        async fn execute(
            &self,
            _target: &str,
            _args: &CanonicalArgs,
            _timeout: Duration,
        ) -> Result<RawFindings, EngineFault> {
            Ok(RawFindings::default())
        }
    }

    #[async_trait]
    impl ScanExecutor for Stalled {
        async fn execute(
            &self,
            _target: &str,
            _args: &CanonicalArgs,
            _timeout: Duration,
        ) -> Result<RawFindings, EngineFault> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(RawFindings::default())
        }
    }

    fn args() -> CanonicalArgs {
        ScanConfigCompiler::default()
            .compile(Some("192.0.2.1"), None, None, None)
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn executor_ignoring_its_timeout_still_times_out() {
        let pool = ScanPool::new(Stalled, 1, Duration::from_secs(10));

        let result = pool.run("192.0.2.1", &args()).await;

        assert_eq!(result, Err(EngineFault::Timeout { seconds: 10 }));
    }

    #[tokio::test]
    async fn huge_timeout_does_not_overflow() {
        let pool = ScanPool::new(Immediate, 1, Duration::from_secs(u64::MAX));

        let result = pool.run("192.0.2.1", &args()).await;

        assert_eq!(result, Ok(RawFindings::default()));
    }

    #[test]
    fn pool_has_at_least_one_worker() {
        let pool = ScanPool::new(Stalled, 0, Duration::from_secs(1));
        assert_eq!(pool.workers(), 1);
    }
}
