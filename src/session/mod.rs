//! SNMP session management.
//!
//! A [`Session`] is a short-lived, exclusively owned connection to one device,
//! created for a single discovery call and never pooled. It adds two things on
//! top of a [`Transport`]:
//!
//! - every request is bounded by the per-request timeout and retried
//!   `retries` times before failing with [`Error::Timeout`]
//! - the transport is closed exactly once, either by [`Session::close`] or,
//!   on any early return, when the session is dropped
//!
//! Concurrent requests on one session take turns. The per-request timer only
//! starts once a request's turn comes, so queueing behind a sibling fetch does
//! not count against it.
//!
//! The primitive read operations are [`get`](Session::get),
//! [`walk_subtree`](Session::walk_subtree) and
//! [`table_columns`](Session::table_columns).

mod builder;
mod columns;
mod walk;

pub use builder::{SessionBuilder, SessionOptions};

use std::future::Future;
use std::net::SocketAddr;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::target::Target;
use crate::transport::{Response, Transport};
use crate::varbind::VarBind;
use crate::version::Version;

/// SNMP session over transport `T`.
pub struct Session<T: Transport> {
    transport: T,
    options: SessionOptions,
    turn: Mutex<()>,
    closed: bool,
}

impl Session<crate::transport::UdpTransport> {
    /// Start building a UDP session to `target`.
    pub fn builder(target: Target) -> SessionBuilder {
        SessionBuilder::new(target)
    }
}

impl<T: Transport> Session<T> {
    /// Wrap an open transport.
    pub fn new(transport: T, options: SessionOptions) -> Self {
        Self {
            transport,
            options,
            turn: Mutex::new(()),
            closed: false,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn version(&self) -> Version {
        self.options.version
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.transport.peer_addr()
    }

    /// Run one request with per-attempt timeout and retries.
    async fn exchange<F, Fut>(
        &self,
        request: &'static str,
        oids: &[Oid],
        mut send: F,
    ) -> Result<Vec<VarBind>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Response>>,
    {
        let peer = self.peer_addr();
        let _turn = self.turn.lock().await;
        let start = Instant::now();

        for attempt in 0..=self.options.retries {
            if attempt > 0 {
                tracing::debug!(target: "snmp_discovery::session", { peer = %peer, attempt }, "retrying {}", request);
            }

            match tokio::time::timeout(self.options.timeout, send()).await {
                Ok(Ok(response)) => return self.check(response, oids),
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    tracing::trace!(target: "snmp_discovery::session", { peer = %peer, attempt }, "{} timed out", request);
                }
            }
        }

        let elapsed = start.elapsed();
        tracing::debug!(target: "snmp_discovery::session", { peer = %peer, ?elapsed, retries = self.options.retries }, "{} got no response", request);
        Err(Error::Timeout {
            target: peer,
            elapsed,
            retries: self.options.retries,
        })
    }

    /// Turn a non-zero error status into [`Error::Snmp`].
    fn check(&self, response: Response, oids: &[Oid]) -> Result<Vec<VarBind>> {
        if response.error_status == 0 {
            return Ok(response.varbinds);
        }

        let status = ErrorStatus::from_code(response.error_status);
        let index = response.error_index;
        // error_index is 1-based; 0 means the error is not tied to a varbind.
        let oid = index
            .checked_sub(1)
            .and_then(|i| oids.get(i as usize))
            .cloned();
        tracing::debug!(target: "snmp_discovery::session", { peer = %self.peer_addr(), %status, index }, "agent returned error status");
        Err(Error::Snmp {
            target: self.peer_addr(),
            status,
            index,
            oid,
        })
    }

    /// GET the given OIDs.
    pub async fn get(&self, oids: &[Oid]) -> Result<Vec<VarBind>> {
        self.exchange("GetRequest", oids, || self.transport.get(oids)).await
    }

    /// GETNEXT from `oid`.
    pub async fn get_next(&self, oid: &Oid) -> Result<Vec<VarBind>> {
        let oids = std::slice::from_ref(oid);
        self.exchange("GetNextRequest", oids, || self.transport.get_next(oid))
            .await
    }

    /// GETBULK from `oids` (SNMPv2c).
    pub async fn get_bulk(
        &self,
        oids: &[Oid],
        non_repeaters: u32,
        max_repetitions: u32,
    ) -> Result<Vec<VarBind>> {
        self.exchange("GetBulkRequest", oids, || {
            self.transport.get_bulk(oids, non_repeaters, max_repetitions)
        })
        .await
    }

    /// Whether `err` is SNMPv1's way of saying "nothing after this OID".
    fn is_v1_end_of_view(&self, err: &Error) -> bool {
        self.options.version == Version::V1
            && matches!(
                err,
                Error::Snmp {
                    status: ErrorStatus::NoSuchName,
                    ..
                }
            )
    }

    /// Close the session and release the transport.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.transport.close();
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.release();
    }
}
