//! Simulated SNMP agent.
//!
//! `Device` holds a MIB as a sorted OID map and answers GET, GETNEXT and
//! GETBULK the way a real agent does. Behaviour switches model the quirks
//! discovery has to cope with: no GETBULK support, subtrees that error,
//! subtrees that never answer, and slow responses.

use snmp_discovery::{
    Connector, Error, Oid, Response, Result, SessionOptions, Target, Transport, Value, VarBind,
    Version,
};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const GEN_ERR: i64 = 5;
const NO_SUCH_NAME: i64 = 2;

/// Request as seen by the device.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Get(Vec<Oid>),
    GetNext(Oid),
    GetBulk { oids: Vec<Oid>, max_repetitions: u32 },
}

#[derive(Debug, Clone, Default)]
struct Behaviour {
    no_bulk: bool,
    failing: Vec<Oid>,
    silent: Vec<Oid>,
    silent_all: bool,
    delay: Duration,
}

#[derive(Debug, Default)]
struct State {
    mib: Mutex<BTreeMap<Oid, Value>>,
    behaviour: Mutex<Behaviour>,
    requests: Mutex<Vec<Request>>,
    opens: AtomicUsize,
    closes: AtomicUsize,
}

/// Simulated device. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct Device {
    state: Arc<State>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Device {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, oid: Oid, value: Value) -> &Self {
        lock(&self.state.mib).insert(oid, value);
        self
    }

    /// Store `rows` under `column`, each row index being a single arc.
    pub fn column(&self, column: &Oid, rows: &[(u32, Value)]) -> &Self {
        for (index, value) in rows {
            self.set(column.child(*index), value.clone());
        }
        self
    }

    /// Store `rows` under `column` with multi-arc row indices.
    pub fn column_indexed(&self, column: &Oid, rows: &[(&[u32], Value)]) -> &Self {
        for (index, value) in rows {
            let mut arcs = column.arcs().to_vec();
            arcs.extend_from_slice(index);
            self.set(Oid::from_slice(&arcs), value.clone());
        }
        self
    }

    /// Remove everything under `prefix`.
    pub fn remove_subtree(&self, prefix: &Oid) -> &Self {
        lock(&self.state.mib).retain(|oid, _| !oid.starts_with(prefix));
        self
    }

    /// Answer GETBULK with genErr.
    pub fn without_bulk(&self) -> &Self {
        lock(&self.state.behaviour).no_bulk = true;
        self
    }

    /// Answer requests inside `prefix` with genErr.
    pub fn failing(&self, prefix: Oid) -> &Self {
        lock(&self.state.behaviour).failing.push(prefix);
        self
    }

    /// Never answer requests inside `prefix`.
    pub fn silent_under(&self, prefix: Oid) -> &Self {
        lock(&self.state.behaviour).silent.push(prefix);
        self
    }

    /// Never answer anything.
    pub fn silent(&self) -> &Self {
        lock(&self.state.behaviour).silent_all = true;
        self
    }

    /// Wait `delay` before every answer.
    pub fn delayed(&self, delay: Duration) -> &Self {
        lock(&self.state.behaviour).delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        lock(&self.state.requests).clone()
    }

    pub fn bulk_requests(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| matches!(r, Request::GetBulk { .. }))
            .count()
    }

    pub fn opens(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    fn behaviour(&self) -> Behaviour {
        lock(&self.state.behaviour).clone()
    }

    /// First entry strictly after `oid`.
    fn next_after(&self, oid: &Oid) -> Option<(Oid, Value)> {
        lock(&self.state.mib)
            .range((Bound::Excluded(oid.clone()), Bound::Unbounded))
            .next()
            .map(|(oid, value)| (oid.clone(), value.clone()))
    }

    fn exact(&self, oid: &Oid) -> Option<Value> {
        lock(&self.state.mib).get(oid).cloned()
    }
}

impl Connector for Device {
    type Transport = DeviceTransport;

    async fn connect(&self, target: &Target, options: &SessionOptions) -> Result<DeviceTransport> {
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        let peer = target
            .to_string()
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([192, 0, 2, 1], target.port())));
        Ok(DeviceTransport {
            device: self.clone(),
            peer,
            version: options.version,
            closed: Arc::default(),
        })
    }
}

/// One session's view of a [`Device`].
pub struct DeviceTransport {
    device: Device,
    peer: SocketAddr,
    version: Version,
    closed: Arc<std::sync::atomic::AtomicBool>,
}

impl DeviceTransport {
    async fn answer(&self, request: Request) -> Result<Response> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::SessionClosed { target: self.peer });
        }
        let behaviour = self.device.behaviour();
        let asked: Vec<Oid> = match &request {
            Request::Get(oids) | Request::GetBulk { oids, .. } => oids.clone(),
            Request::GetNext(oid) => vec![oid.clone()],
        };
        lock(&self.device.state.requests).push(request.clone());

        if !behaviour.delay.is_zero() {
            tokio::time::sleep(behaviour.delay).await;
        }
        if behaviour.silent_all
            || asked
                .iter()
                .any(|oid| behaviour.silent.iter().any(|p| oid.starts_with(p)))
        {
            return std::future::pending().await;
        }
        if asked
            .iter()
            .any(|oid| behaviour.failing.iter().any(|p| oid.starts_with(p)))
        {
            return Ok(Response::error(GEN_ERR, 1));
        }

        match request {
            Request::Get(oids) => Ok(Response::ok(
                oids.into_iter()
                    .map(|oid| {
                        let value = self.device.exact(&oid).unwrap_or(Value::NoSuchObject);
                        VarBind::new(oid, value)
                    })
                    .collect(),
            )),
            Request::GetNext(oid) => match self.device.next_after(&oid) {
                Some((next, value)) => Ok(Response::ok(vec![VarBind::new(next, value)])),
                None if self.version == Version::V1 => Ok(Response::error(NO_SUCH_NAME, 1)),
                None => Ok(Response::ok(vec![VarBind::new(oid, Value::EndOfMibView)])),
            },
            Request::GetBulk { .. } if behaviour.no_bulk => Ok(Response::error(GEN_ERR, 0)),
            Request::GetBulk {
                oids,
                max_repetitions,
            } => Ok(Response::ok(self.bulk(oids, max_repetitions))),
        }
    }

    fn bulk(&self, mut cursors: Vec<Oid>, max_repetitions: u32) -> Vec<VarBind> {
        let mut varbinds = Vec::new();
        for _ in 0..max_repetitions {
            let mut all_ended = true;
            for cursor in cursors.iter_mut() {
                match self.device.next_after(cursor) {
                    Some((next, value)) => {
                        *cursor = next.clone();
                        varbinds.push(VarBind::new(next, value));
                        all_ended = false;
                    }
                    None => varbinds.push(VarBind::new(cursor.clone(), Value::EndOfMibView)),
                }
            }
            if all_ended {
                break;
            }
        }
        varbinds
    }
}

impl Transport for DeviceTransport {
    async fn get(&self, oids: &[Oid]) -> Result<Response> {
        self.answer(Request::Get(oids.to_vec())).await
    }

    async fn get_next(&self, oid: &Oid) -> Result<Response> {
        self.answer(Request::GetNext(oid.clone())).await
    }

    async fn get_bulk(
        &self,
        oids: &[Oid],
        _non_repeaters: u32,
        max_repetitions: u32,
    ) -> Result<Response> {
        self.answer(Request::GetBulk {
            oids: oids.to_vec(),
            max_repetitions,
        })
        .await
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.device.state.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}
