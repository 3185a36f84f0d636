//! UDP transport backed by the `snmp2` session.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use snmp2::AsyncSession;
use tokio::sync::{Mutex, MutexGuard};

use super::{Connector, Response, Transport};
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::session::SessionOptions;
use crate::target::Target;
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

/// Request IDs advance by this much per session so concurrent sessions to the
/// same agent do not start from the same ID.
const REQUEST_ID_STRIDE: i32 = 10_000;

/// Stale replies tolerated for one request before giving up on it.
const STALE_REPLY_LIMIT: usize = 3;

static NEXT_REQUEST_ID: AtomicI32 = AtomicI32::new(1);

fn starting_request_id() -> i32 {
    let id = NEXT_REQUEST_ID.fetch_add(REQUEST_ID_STRIDE, Ordering::Relaxed);
    // Keep IDs positive after wrap-around.
    id.rem_euclid(i32::MAX - REQUEST_ID_STRIDE) + 1
}

async fn open(peer: SocketAddr, community: &[u8], version: Version) -> Result<AsyncSession> {
    let request_id = starting_request_id();
    match version {
        Version::V1 => AsyncSession::new_v1(peer, community, request_id).await,
        Version::V2c => AsyncSession::new_v2c(peer, community, request_id).await,
    }
    .map_err(|source| Error::Io {
        target: Some(peer),
        source,
    })
}

/// The wire session and whether its socket can be trusted.
struct Slot {
    session: Option<AsyncSession>,
    /// Set while an exchange is in flight. Stays set when that exchange is
    /// abandoned or ends on a wire error, since its reply may still arrive.
    dirty: bool,
}

/// UDP transport owning one `snmp2` session.
///
/// Exchanges are serialized through an async mutex because the session reuses
/// a single receive buffer. After an unfinished exchange the next request
/// goes out on a fresh socket, so a late reply is never read as the answer
/// to a later request.
pub struct UdpTransport {
    peer: SocketAddr,
    community: Vec<u8>,
    version: Version,
    slot: Mutex<Slot>,
    closed: AtomicBool,
}

impl UdpTransport {
    /// Open a session to `peer` with the given credentials.
    pub async fn connect(peer: SocketAddr, community: &[u8], version: Version) -> Result<Self> {
        let session = open(peer, community, version).await?;

        tracing::debug!(target: "snmp_discovery::transport", { peer = %peer, %version }, "UDP session opened");

        Ok(Self {
            peer,
            community: community.to_vec(),
            version,
            slot: Mutex::new(Slot {
                session: Some(session),
                dirty: false,
            }),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::SessionClosed { target: self.peer });
        }
        Ok(())
    }

    /// Lock the session, replacing its socket if the last exchange did not finish.
    async fn ready(&self) -> Result<MutexGuard<'_, Slot>> {
        self.ensure_open()?;
        let mut slot = self.slot.lock().await;
        if slot.session.is_none() {
            return Err(Error::SessionClosed { target: self.peer });
        }
        if slot.dirty {
            tracing::debug!(target: "snmp_discovery::transport", { peer = %self.peer }, "reopening UDP session after an unfinished exchange");
            slot.session = Some(open(self.peer, &self.community, self.version).await?);
            slot.dirty = false;
        }
        Ok(slot)
    }

    /// The session of a ready slot, marked in flight.
    fn in_flight<'s>(&self, slot: &'s mut Slot) -> Result<&'s mut AsyncSession> {
        slot.dirty = true;
        slot.session
            .as_mut()
            .ok_or(Error::SessionClosed { target: self.peer })
    }

    /// Final result of one exchange, or `None` when a stale reply was read
    /// and the request must go out again.
    fn settle(
        &self,
        slot: &mut Slot,
        reply: std::result::Result<Result<Response>, snmp2::Error>,
    ) -> Option<Result<Response>> {
        match reply {
            Ok(response) => {
                slot.dirty = false;
                Some(response)
            }
            Err(snmp2::Error::RequestIdMismatch) => {
                tracing::debug!(target: "snmp_discovery::transport", { peer = %self.peer }, "discarding stale reply");
                None
            }
            Err(e) => Some(Err(self.wire_failure(e))),
        }
    }

    fn stale_replies(&self) -> Error {
        Error::Transport {
            target: self.peer,
            message: format!("no matching reply after {STALE_REPLY_LIMIT} stale replies"),
        }
    }

    fn wire_oid(&self, oid: &Oid) -> Result<snmp2::Oid<'static>> {
        let arcs: Vec<u64> = oid.arcs().iter().map(|&a| u64::from(a)).collect();
        snmp2::Oid::from(&arcs[..]).map_err(|e| Error::Transport {
            target: self.peer,
            message: format!("cannot encode OID {oid}: {e:?}"),
        })
    }

    fn wire_oids(&self, oids: &[Oid]) -> Result<Vec<snmp2::Oid<'static>>> {
        oids.iter().map(|oid| self.wire_oid(oid)).collect()
    }

    fn wire_failure(&self, e: snmp2::Error) -> Error {
        Error::Transport {
            target: self.peer,
            message: format!("{e:?}"),
        }
    }

    fn decode(&self, pdu: snmp2::Pdu<'_>) -> Result<Response> {
        let mut varbinds = Vec::new();
        for (oid, value) in pdu.varbinds {
            let oid = decode_oid(self.peer, &oid)?;
            varbinds.push(VarBind::new(oid, decode_value(self.peer, value)?));
        }
        Ok(Response {
            error_status: i64::from(pdu.error_status),
            error_index: pdu.error_index,
            varbinds,
        })
    }
}

fn decode_oid(peer: SocketAddr, oid: &snmp2::Oid<'_>) -> Result<Oid> {
    Oid::parse(&oid.to_id_string()).map_err(|_| Error::Transport {
        target: peer,
        message: format!("agent returned an unrepresentable OID {}", oid.to_id_string()),
    })
}

fn decode_value(peer: SocketAddr, value: snmp2::Value<'_>) -> Result<Value> {
    Ok(match value {
        snmp2::Value::Integer(v) => Value::Integer(v),
        snmp2::Value::OctetString(b) => Value::OctetString(bytes::Bytes::copy_from_slice(b)),
        snmp2::Value::Null => Value::Null,
        snmp2::Value::ObjectIdentifier(oid) => Value::ObjectIdentifier(decode_oid(peer, &oid)?),
        snmp2::Value::IpAddress(ip) => Value::IpAddress(ip),
        snmp2::Value::Counter32(v) => Value::Counter32(v),
        snmp2::Value::Unsigned32(v) => Value::Gauge32(v),
        snmp2::Value::Timeticks(v) => Value::TimeTicks(v),
        snmp2::Value::Opaque(b) => Value::Opaque(bytes::Bytes::copy_from_slice(b)),
        snmp2::Value::Counter64(v) => Value::Counter64(v),
        snmp2::Value::NoSuchObject => Value::NoSuchObject,
        snmp2::Value::NoSuchInstance => Value::NoSuchInstance,
        snmp2::Value::EndOfMibView => Value::EndOfMibView,
        other => {
            tracing::debug!(target: "snmp_discovery::transport", { peer = %peer, value = ?other }, "unsupported value type, treating as NULL");
            Value::Null
        }
    })
}

impl Transport for UdpTransport {
    async fn get(&self, oids: &[Oid]) -> Result<Response> {
        if oids.is_empty() {
            return Err(Error::Transport {
                target: self.peer,
                message: "GET without OIDs".into(),
            });
        }
        let wire = self.wire_oids(oids)?;
        let refs: Vec<&snmp2::Oid<'static>> = wire.iter().collect();

        for _ in 0..STALE_REPLY_LIMIT {
            let mut slot = self.ready().await?;
            let reply = self
                .in_flight(&mut slot)?
                .get_many(&refs)
                .await
                .map(|pdu| self.decode(pdu));
            if let Some(response) = self.settle(&mut slot, reply) {
                return response;
            }
        }
        Err(self.stale_replies())
    }

    async fn get_next(&self, oid: &Oid) -> Result<Response> {
        let wire = self.wire_oid(oid)?;

        for _ in 0..STALE_REPLY_LIMIT {
            let mut slot = self.ready().await?;
            let reply = self
                .in_flight(&mut slot)?
                .getnext(&wire)
                .await
                .map(|pdu| self.decode(pdu));
            if let Some(response) = self.settle(&mut slot, reply) {
                return response;
            }
        }
        Err(self.stale_replies())
    }

    async fn get_bulk(
        &self,
        oids: &[Oid],
        non_repeaters: u32,
        max_repetitions: u32,
    ) -> Result<Response> {
        let wire = self.wire_oids(oids)?;
        let refs: Vec<&snmp2::Oid<'static>> = wire.iter().collect();

        for _ in 0..STALE_REPLY_LIMIT {
            let mut slot = self.ready().await?;
            let reply = self
                .in_flight(&mut slot)?
                .getbulk(&refs, non_repeaters, max_repetitions)
                .await
                .map(|pdu| self.decode(pdu));
            if let Some(response) = self.settle(&mut slot, reply) {
                return response;
            }
        }
        Err(self.stale_replies())
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        // An abandoned exchange may still hold the lock; its socket is
        // released when that future is dropped.
        if let Ok(mut slot) = self.slot.try_lock() {
            slot.session.take();
        }
        tracing::debug!(target: "snmp_discovery::transport", { peer = %self.peer }, "UDP session closed");
    }
}

/// Connects [`UdpTransport`]s over the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpConnector;

impl Connector for UdpConnector {
    type Transport = UdpTransport;

    async fn connect(&self, target: &Target, options: &SessionOptions) -> Result<UdpTransport> {
        let peer = target.resolve(options.transport).await?;
        UdpTransport::connect(peer, target.community().as_bytes(), options.version).await
    }
}
