//! Ordered fallback strategies.
//!
//! A discovery protocol is a list of tiers tried in order. Each tier either
//! yields rows, yields nothing, or fails:
//!
//! | Outcome | Action |
//! |---|---|
//! | rows | stop, return them |
//! | no rows | escalate to the next tier |
//! | error | escalate, unless it must propagate |
//!
//! An error propagates when the call's deadline has expired, when it comes
//! from the last tier, or when the first tier got no response at all (the
//! device is unreachable, so later tiers would only wait out the same
//! timeouts). Running out of tiers is an empty result, not an error.

use std::fmt::Display;
use std::future::Future;

use crate::error::{Error, Result};
use crate::timeout::Deadline;

pub(crate) async fn run_tiers<S, R, F, Fut>(
    protocol: &'static str,
    tiers: &[S],
    deadline: &Deadline,
    mut attempt: F,
) -> Result<Vec<R>>
where
    S: Copy + Display,
    F: FnMut(S) -> Fut,
    Fut: Future<Output = Result<Vec<R>>>,
{
    let last = tiers.len().saturating_sub(1);

    for (position, &tier) in tiers.iter().enumerate() {
        match attempt(tier).await {
            Ok(rows) if !rows.is_empty() => {
                tracing::debug!(target: "snmp_discovery::discovery", { protocol, %tier, rows = rows.len() }, "tier produced rows");
                return Ok(rows);
            }
            Ok(_) => {
                tracing::debug!(target: "snmp_discovery::discovery", { protocol, %tier }, "tier empty, escalating");
            }
            Err(e) if must_propagate(&e, position, last, deadline) => return Err(e),
            Err(e) => {
                tracing::warn!(target: "snmp_discovery::discovery", { protocol, %tier, error = %e }, "tier failed, escalating");
            }
        }
    }

    Ok(Vec::new())
}

fn must_propagate(err: &Error, position: usize, last: usize, deadline: &Deadline) -> bool {
    deadline.is_expired()
        || position == last
        || (position == 0 && matches!(err, Error::Timeout { .. }))
}
