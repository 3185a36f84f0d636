//! Timeout orchestration.
//!
//! Every SNMP round trip made during discovery is raced against a timer here.
//! On expiry the pending exchange is dropped, so a late datagram is discarded
//! with the future that would have consumed it, and the caller gets
//! [`Error::Deadline`] carrying the operation's label.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Error, Result};

/// Race `op` against a timer of `limit`.
///
/// The timer is dropped with the call, so nothing outlives a completed
/// operation.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use snmp_discovery::timeout::with_timeout;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let fast = with_timeout(async { Ok(7) }, Duration::from_secs(1), "SNMP ping timeout").await;
/// assert_eq!(fast.unwrap(), 7);
/// # }
/// ```
pub async fn with_timeout<F, T>(op: F, limit: Duration, label: &'static str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, op).await {
        Ok(result) => result,
        Err(_) => Err(Error::Deadline { label, limit }),
    }
}

/// Fixed point in time by which a multi-step discovery call must finish.
///
/// Each step run through the deadline is bounded by whatever time the call
/// has left, so the call as a whole never outlives `limit` regardless of how
/// many steps or tiers it goes through.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    /// Start a deadline `limit` from now.
    pub fn after(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    /// The overall limit this deadline was created with.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Time spent since the deadline started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before expiry (zero once expired).
    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.started.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Run `op` bounded by the time left on this deadline.
    pub async fn run<F, T>(&self, op: F, label: &'static str) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout_at(self.started + self.limit, op).await {
            Ok(result) => result,
            Err(_) => Err(Error::Deadline {
                label,
                limit: self.limit,
            }),
        }
    }

    /// Run `op` bounded by `step`, or by the time left if that is shorter.
    ///
    /// The reported limit is whichever bound actually applied.
    pub async fn run_step<F, T>(&self, op: F, step: Duration, label: &'static str) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if step < self.remaining() {
            with_timeout(op, step, label).await
        } else {
            self.run(op, label).await
        }
    }
}
