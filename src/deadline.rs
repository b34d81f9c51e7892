//! Global wall-clock budget for a scan.
//!
//! A [`Deadline`] is raced against work rather than killing it: whatever
//! finishes first decides the outcome. When the clock wins, the shared
//! cancellation token fires so cooperative work (the crawl) can stop at its
//! next checkpoint, and the abandoned future is dropped.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// The deadline ran out before the raced work finished
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("deadline of {budget:?} expired")]
pub struct DeadlineExpired {
    pub budget: Duration,
}

#[derive(Debug, Clone)]
pub struct Deadline {
    budget: Duration,
    expires_at: Instant,
    token: CancellationToken,
}

impl Deadline {
    pub fn start(budget: Duration) -> Self {
        Self {
            budget,
            expires_at: Instant::now() + budget,
            token: CancellationToken::new(),
        }
    }

    /// Token cancelled when a race against this deadline is lost
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Run `work` until it completes or the deadline passes
    pub async fn race<F>(&self, work: F) -> Result<F::Output, DeadlineExpired>
    where
        F: Future,
    {
        match tokio::time::timeout_at(self.expires_at, work).await {
            Ok(output) => Ok(output),
            Err(_) => {
                ::log::warn!("Deadline of {:?} expired; cancelling in-flight work", self.budget);
                self.token.cancel();
                Err(DeadlineExpired {
                    budget: self.budget,
                })
            }
        }
    }

    /// Run auxiliary `work` for at most `limit`, never past the deadline.
    ///
    /// Returns `None` on timeout without cancelling the shared token; one slow
    /// side task must not take the primary work down with it.
    pub async fn bounded<F>(&self, limit: Duration, work: F) -> Option<F::Output>
    where
        F: Future,
    {
        let limit = limit.min(self.remaining());
        match tokio::time::timeout(limit, work).await {
            Ok(output) => Some(output),
            Err(_) => {
                ::log::debug!("Auxiliary work abandoned after {:?}", limit);
                None
            }
        }
    }
}
