//! Loopback UDP agent for exercising the real transport.
//!
//! The agent answers GET and GETNEXT by echoing the request back as a
//! GetResponse, so every varbind comes back with the requested OID and a
//! NULL value. Binds an ephemeral localhost port and stops on drop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// How the agent sends its replies.
#[derive(Debug, Clone, Copy)]
pub enum Replies {
    /// Answer every request once, immediately.
    Prompt,
    /// Hold the first reply back for the given time; answer the rest promptly.
    FirstLate(Duration),
    /// Send every reply twice.
    Duplicated,
}

pub struct EchoAgent {
    addr: SocketAddr,
    received: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl EchoAgent {
    pub async fn start(replies: Replies) -> Self {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let addr = socket.local_addr().unwrap();
        let received = Arc::new(AtomicUsize::new(0));

        let counter = received.clone();
        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; 65_535];
            loop {
                let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                    continue;
                };
                let Some(reply) = echo(&buf[..len]) else {
                    continue;
                };
                let seen = counter.fetch_add(1, Ordering::SeqCst);
                match replies {
                    Replies::FirstLate(delay) if seen == 0 => {
                        let socket = socket.clone();
                        tokio::spawn(async move {
                            tokio::time::sleep(delay).await;
                            let _ = socket.send_to(&reply, from).await;
                        });
                    }
                    Replies::Duplicated => {
                        let _ = socket.send_to(&reply, from).await;
                        let _ = socket.send_to(&reply, from).await;
                    }
                    _ => {
                        let _ = socket.send_to(&reply, from).await;
                    }
                }
            }
        });

        Self {
            addr,
            received,
            task,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Requests answered so far.
    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }
}

impl Drop for EchoAgent {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Turn a GetRequest or GetNextRequest message into a GetResponse.
fn echo(request: &[u8]) -> Option<Vec<u8>> {
    let mut reply = request.to_vec();
    let (message, _) = header(&reply, 0)?;
    let community = skip(&reply, message)?;
    let pdu = skip(&reply, community)?;
    match reply.get(pdu)? {
        0xA0 | 0xA1 => reply[pdu] = 0xA2,
        _ => return None,
    }
    Some(reply)
}

/// (header length, content length) of the BER element at `pos`.
fn header(buf: &[u8], pos: usize) -> Option<(usize, usize)> {
    let first = *buf.get(pos + 1)?;
    if first < 0x80 {
        return Some((2, usize::from(first)));
    }
    let octets = usize::from(first & 0x7f);
    let mut len = 0usize;
    for i in 0..octets {
        len = (len << 8) | usize::from(*buf.get(pos + 2 + i)?);
    }
    Some((2 + octets, len))
}

/// Position after the BER element at `pos`.
fn skip(buf: &[u8], pos: usize) -> Option<usize> {
    let (header, len) = header(buf, pos)?;
    Some(pos + header + len)
}
