//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{Response, Transport};
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

/// Request as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum MockRequest {
    Get(Vec<Oid>),
    GetNext(Oid),
    GetBulk {
        oids: Vec<Oid>,
        max_repetitions: u32,
    },
}

enum Reply {
    Response(Response),
    Silence,
}

#[derive(Default)]
struct State {
    replies: VecDeque<Reply>,
    requests: Vec<MockRequest>,
}

/// Transport that answers from a queue of scripted replies.
///
/// An exhausted queue answers with silence. Clones share state, so a test can
/// keep a handle for assertions after moving the transport into a session.
#[derive(Clone)]
pub struct MockTransport {
    peer: SocketAddr,
    state: Arc<Mutex<State>>,
    closes: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            peer,
            state: Arc::default(),
            closes: Arc::default(),
        }
    }

    pub fn queue_response(&self, response: Response) {
        self.lock().replies.push_back(Reply::Response(response));
    }

    /// Queue a successful response built from `(oid, value)` pairs.
    pub fn queue_varbinds(&self, varbinds: impl IntoIterator<Item = (Oid, Value)>) {
        let varbinds = varbinds
            .into_iter()
            .map(|(oid, value)| VarBind::new(oid, value))
            .collect();
        self.queue_response(Response::ok(varbinds));
    }

    /// Queue a request that never gets an answer.
    pub fn queue_timeout(&self) {
        self.lock().replies.push_back(Reply::Silence);
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.lock().requests.clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn answer(&self, request: MockRequest) -> Result<Response> {
        if self.close_count() > 0 {
            return Err(Error::SessionClosed { target: self.peer });
        }
        let reply = {
            let mut state = self.lock();
            state.requests.push(request);
            state.replies.pop_front()
        };
        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Silence) | None => std::future::pending().await,
        }
    }
}

impl Transport for MockTransport {
    async fn get(&self, oids: &[Oid]) -> Result<Response> {
        self.answer(MockRequest::Get(oids.to_vec())).await
    }

    async fn get_next(&self, oid: &Oid) -> Result<Response> {
        self.answer(MockRequest::GetNext(oid.clone())).await
    }

    async fn get_bulk(
        &self,
        oids: &[Oid],
        _non_repeaters: u32,
        max_repetitions: u32,
    ) -> Result<Response> {
        self.answer(MockRequest::GetBulk {
            oids: oids.to_vec(),
            max_repetitions,
        })
        .await
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
