//! Session options and builder.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use snmp_discovery::{Session, Target};
//! # use std::time::Duration;
//! # async fn example() -> snmp_discovery::Result<()> {
//! let target = Target::new("192.0.2.1", "public", 161)?;
//! let session = Session::builder(target)
//!     .timeout(Duration::from_secs(2))
//!     .retries(2)
//!     .connect()
//!     .await?;
//! let sys_name = session.get(&[snmp_discovery::mib::sys_name()]).await?;
//! session.close();
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use crate::error::Result;
use crate::target::Target;
use crate::transport::{Connector, Transport, TransportKind, UdpConnector, UdpTransport};
use crate::version::Version;

use super::Session;

/// Per-session protocol settings.
///
/// Defaults: SNMPv2c, 5 s per-request timeout, 1 retry, UDP over IPv4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub version: Version,
    /// Time to wait for each individual response.
    pub timeout: Duration,
    /// Additional attempts after the first request times out.
    pub retries: u32,
    pub transport: TransportKind,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            version: Version::V2c,
            timeout: Duration::from_secs(5),
            retries: 1,
            transport: TransportKind::Udp4,
        }
    }
}

/// Builder for [`Session`].
///
/// Created via [`Session::builder()`].
pub struct SessionBuilder {
    target: Target,
    options: SessionOptions,
}

impl SessionBuilder {
    pub(crate) fn new(target: Target) -> Self {
        Self {
            target,
            options: SessionOptions::default(),
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the SNMP version.
    pub fn version(mut self, version: Version) -> Self {
        self.options.version = version;
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set the number of retries.
    pub fn retries(mut self, retries: u32) -> Self {
        self.options.retries = retries;
        self
    }

    /// Set the IP family.
    pub fn transport(mut self, transport: TransportKind) -> Self {
        self.options.transport = transport;
        self
    }

    /// Connect over UDP.
    pub async fn connect(self) -> Result<Session<UdpTransport>> {
        self.connect_with(&UdpConnector).await
    }

    /// Connect through `connector`.
    pub async fn connect_with<C: Connector>(self, connector: &C) -> Result<Session<C::Transport>> {
        let transport = connector.connect(&self.target, &self.options).await?;
        Ok(self.build(transport))
    }

    /// Build a session over a pre-supplied transport.
    pub fn build<T: Transport>(self, transport: T) -> Session<T> {
        Session::new(transport, self.options)
    }
}
