//! Periodic removal of idle credential records.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use mailgate_core::config::SessionConfig;
use mailgate_core::result::AppResult;

use super::store::SessionStore;

/// Runs the session store's expiry sweep on an interval.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    /// Session store to sweep.
    sessions: Arc<SessionStore>,
    /// Time between sweeps.
    interval: Duration,
}

impl SessionCleanup {
    /// Create a cleanup task for `sessions`.
    pub fn new(sessions: Arc<SessionStore>, config: &SessionConfig) -> Self {
        Self {
            sessions,
            interval: Duration::from_secs(config.cleanup_interval_minutes.max(1).saturating_mul(60)),
        }
    }

    /// Time between sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one cleanup cycle. Returns the number of records removed.
    pub async fn run_cleanup(&self) -> AppResult<usize> {
        self.sessions.sweep_expired().await
    }

    /// Sweep immediately, then every interval, until `shutdown` turns true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Session cleanup started"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Session cleanup received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cleanup().await {
                        error!(error = %e, "Session cleanup cycle failed");
                    }
                }
            }
        }

        info!("Session cleanup stopped");
    }
}
