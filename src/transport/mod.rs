//! Transport layer abstraction.
//!
//! A [`Transport`] performs one SNMP request/response exchange at a time for a
//! single device. Encoding, request IDs and the community string live below
//! this seam; retries and timeouts live above it in
//! [`Session`](crate::session::Session).
//!
//! A [`Connector`] opens a fresh transport per discovery call. The gateway is
//! generic over it so tests can swap the network for a simulated device.

mod udp;

#[cfg(test)]
mod mock;

pub use udp::*;

#[cfg(test)]
pub use mock::*;

use crate::error::Result;
use crate::oid::Oid;
use crate::session::SessionOptions;
use crate::target::Target;
use crate::varbind::VarBind;
use std::future::Future;
use std::net::SocketAddr;

/// Which IP family to talk to a device over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// UDP over IPv4.
    #[default]
    Udp4,
    /// UDP over IPv6.
    Udp6,
}

impl TransportKind {
    /// Whether `addr` belongs to this family.
    pub fn accepts(self, addr: &SocketAddr) -> bool {
        match self {
            TransportKind::Udp4 => addr.is_ipv4(),
            TransportKind::Udp6 => addr.is_ipv6(),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Udp4 => write!(f, "udp4"),
            TransportKind::Udp6 => write!(f, "udp6"),
        }
    }
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp4" | "udp" => Ok(TransportKind::Udp4),
            "udp6" => Ok(TransportKind::Udp6),
            other => Err(format!("unsupported transport '{other}' (expected udp4 or udp6)")),
        }
    }
}

/// Decoded response PDU.
///
/// `error_status` is the raw code from the agent; the session turns non-zero
/// codes into [`Error::Snmp`](crate::Error::Snmp).
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub error_status: i64,
    pub error_index: u32,
    pub varbinds: Vec<VarBind>,
}

impl Response {
    /// A successful response carrying `varbinds`.
    pub fn ok(varbinds: Vec<VarBind>) -> Self {
        Self {
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// An error response (no usable varbinds).
    pub fn error(error_status: i64, error_index: u32) -> Self {
        Self {
            error_status,
            error_index,
            varbinds: Vec::new(),
        }
    }
}

/// Client-side transport abstraction.
///
/// Methods never time out on their own: the session races each call against
/// its per-request timeout and drops the future when it fires.
pub trait Transport: Send + Sync {
    /// Send a GetRequest for `oids`.
    fn get(&self, oids: &[Oid]) -> impl Future<Output = Result<Response>> + Send;

    /// Send a GetNextRequest for `oid`.
    fn get_next(&self, oid: &Oid) -> impl Future<Output = Result<Response>> + Send;

    /// Send a GetBulkRequest (SNMPv2c only).
    fn get_bulk(
        &self,
        oids: &[Oid],
        non_repeaters: u32,
        max_repetitions: u32,
    ) -> impl Future<Output = Result<Response>> + Send;

    /// The peer address for this transport.
    ///
    /// Named to match [`std::net::UdpSocket::peer_addr()`].
    fn peer_addr(&self) -> SocketAddr;

    /// Release the underlying socket. Later requests fail with
    /// [`Error::SessionClosed`](crate::Error::SessionClosed).
    fn close(&self);
}

/// Opens one transport per discovery call.
pub trait Connector: Send + Sync {
    type Transport: Transport;

    /// Resolve `target` and open a transport to it.
    fn connect(
        &self,
        target: &Target,
        options: &SessionOptions,
    ) -> impl Future<Output = Result<Self::Transport>> + Send;
}
