//! SyncController implementation

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use git2consul_git::{Advance, Ensured, Mirror};
use git2consul_kv::KvStore;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::{RetryPolicy, SyncConfig};
use crate::walk::{FullWalk, PairSource};
use crate::{Error, ErrorKind, Result};

/// Outcome of one successful sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// How the mirror moved before the walk
    pub advance: Advance,
    /// Number of keys written to the store
    pub keys_written: usize,
}

/// Drives a mirror and a store through repeated sync cycles.
///
/// A cycle fast-forwards the mirror, then writes every pair produced by the
/// [`PairSource`] to the store, one write at a time. Git work runs on the
/// blocking thread pool; store writes are awaited in order, so a failed
/// write stops the cycle before any later key is touched.
///
/// Snapshot files are read with blocking `std::fs` calls directly on the
/// async task, one file between two store writes. A cycle therefore holds a
/// runtime worker for the duration of each local read; run the controller on
/// a multi-threaded runtime so other tasks (the status endpoint, the signal
/// listener) keep being polled.
///
/// Transient failures are retried with exponential backoff according to the
/// configured [`RetryPolicy`]. Permanent failures end [`SyncController::run`].
pub struct SyncController<M, S, P = FullWalk> {
    mirror: Arc<M>,
    store: S,
    source: P,
    interval: Duration,
    retry: RetryPolicy,
}

impl<M, S> SyncController<M, S, FullWalk>
where
    M: Mirror + 'static,
    S: KvStore,
{
    pub fn new(config: &SyncConfig, mirror: M, store: S) -> Self {
        Self {
            mirror: Arc::new(mirror),
            store,
            source: FullWalk,
            interval: config.polling_interval,
            retry: config.retry,
        }
    }
}

impl<M, S, P> SyncController<M, S, P>
where
    M: Mirror + 'static,
    S: KvStore,
    P: PairSource,
{
    /// Replace the pair source used by every cycle.
    pub fn with_source<Q: PairSource>(self, source: Q) -> SyncController<M, S, Q> {
        SyncController {
            mirror: self.mirror,
            store: self.store,
            source,
            interval: self.interval,
            retry: self.retry,
        }
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Make sure the local mirror exists, cloning it if necessary.
    pub async fn start(&self) -> Result<Ensured> {
        let ensured = self.blocking("clone", |mirror| mirror.ensure()).await?;
        tracing::info!(
            revision = %ensured.revision(),
            cloned = matches!(ensured, Ensured::Cloned(_)),
            "Mirror ready"
        );
        Ok(ensured)
    }

    /// Run one pull-and-walk cycle.
    ///
    /// Writes happen in walk order. The first failure, whether reading a
    /// file or writing a key, aborts the cycle and is returned.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let head = self.blocking("read HEAD", |mirror| mirror.head()).await?;
        tracing::info!(revision = %head, "Pulling latest changes");

        let advance = self.blocking("pull", |mirror| mirror.advance()).await?;
        tracing::info!(
            revision = %advance.after(),
            changed = advance.changed(),
            "Mirror is at {}",
            advance.after()
        );

        let snapshot = self.mirror.snapshot();
        let mut keys_written = 0;
        for pair in self.source.pairs(&snapshot) {
            let pair = pair?;
            self.store.put(&pair.key, &pair.value).await?;
            tracing::debug!(key = %pair.key, bytes = pair.value.len(), "Wrote key");
            keys_written += 1;
        }

        tracing::info!(
            revision = %advance.after(),
            keys = keys_written,
            "Sync cycle complete"
        );
        Ok(CycleReport {
            advance,
            keys_written,
        })
    }

    /// Start the mirror, then run a cycle every interval until `shutdown`
    /// turns `true` or a failure cannot be retried.
    ///
    /// The first cycle runs one interval after start. If a cycle overruns
    /// the interval the next one starts a full interval after it finishes.
    /// Shutdown is honoured while waiting for a tick, while backing off and
    /// in the middle of a cycle; an interrupted cycle writes nothing further.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let outcome = tokio::select! {
            result = self.run_until_failure() => result,
            _ = shutdown.wait_for(|stop| *stop) => {
                tracing::info!("Shutdown requested, stopping sync loop");
                Ok(())
            }
        };

        if let Err(e) = &outcome {
            tracing::error!(error = %e, kind = ?e.kind(), "Sync stopped");
        }
        outcome
    }

    async fn run_until_failure(&self) -> Result<()> {
        self.with_retry("clone", || self.start()).await?;

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.with_retry("sync cycle", || self.run_cycle()).await?;
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = self.retry.backoff();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let error = match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if e.kind() == ErrorKind::Transient => e,
                Err(e) => return Err(e),
            };

            let Some(delay) = backoff.next_backoff() else {
                return Err(Error::RetriesExhausted {
                    operation: operation.to_string(),
                    attempts,
                    source: Box::new(error),
                });
            };
            tracing::warn!(
                operation,
                attempt = attempts,
                retry_in = ?delay,
                error = %error,
                "Transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn blocking<T, F>(&self, operation: &str, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&M) -> git2consul_git::Result<T> + Send + 'static,
    {
        let mirror = Arc::clone(&self.mirror);
        let result = tokio::task::spawn_blocking(move || work(&mirror))
            .await
            .map_err(|e| Error::Task {
                operation: operation.to_string(),
                message: e.to_string(),
            })?;
        Ok(result?)
    }
}
