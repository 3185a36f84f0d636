// Error carries OIDs inline for diagnostics.
#![allow(clippy::result_large_err)]

//! # snmp-discovery
//!
//! Timeout-bounded SNMP discovery of interface and BGP peer inventories on
//! heterogeneous network devices.
//!
//! Devices differ in which parts of IF-MIB and BGP4-MIB they implement, and
//! some do not implement GETBULK properly. Each discovery protocol therefore
//! tries an ordered list of strategies and falls through to the next one when
//! a strategy yields nothing. Optional reads that fail degrade to empty
//! columns instead of failing the call.
//!
//! No call can hang its caller. Every request has a per-request timeout with
//! retries, every protocol step is bounded by the call's global deadline, and
//! the per-call session is closed on every exit path.
//!
//! ## Layers
//!
//! | Layer | Module |
//! |---|---|
//! | Deadlines | [`timeout`] |
//! | Sessions and the `get`/`walk_subtree`/`table_columns` primitives | [`session`] |
//! | Row reconstruction from columns | [`table`] |
//! | Interface and BGP protocols, [`Gateway`] | [`discovery`] |
//!
//! ## Example
//!
//! ```rust,no_run
//! use snmp_discovery::{Gateway, GatewayConfig, Target};
//!
//! # async fn example() -> snmp_discovery::Result<()> {
//! let gateway = Gateway::new(GatewayConfig::from_env());
//! let target = Target::new("192.0.2.1", "public", 161)?;
//!
//! let bgp = gateway.discover_bgp_peers(&target).await?;
//! println!("AS{} has {} peers", bgp.local_asn, bgp.count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate logs through [`tracing`] under the `snmp_discovery::session`,
//! `snmp_discovery::discovery` and `snmp_discovery::transport` targets.
//! Community strings are never logged.

pub mod config;
pub mod discovery;
pub mod error;
pub mod mib;
pub mod oid;
pub mod prelude;
pub mod session;
pub mod table;
pub mod target;
pub mod timeout;
pub mod transport;
pub mod value;
pub mod varbind;
pub mod version;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::GatewayConfig;
pub use discovery::{
    BgpDiscovery, BgpPeerRecord, Gateway, InterfaceDiscovery, InterfaceRecord, PingReply,
};
pub use error::{Error, ErrorClass, ErrorStatus, InputField, OidErrorKind, Result};
pub use oid::Oid;
pub use session::{Session, SessionBuilder, SessionOptions};
pub use target::{DEFAULT_PORT, Target};
pub use timeout::{Deadline, with_timeout};
pub use transport::{Connector, Response, Transport, TransportKind, UdpConnector, UdpTransport};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
