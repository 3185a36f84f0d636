//! Device discovery.
//!
//! [`Gateway`] is the entry point: each call opens a fresh session to one
//! device, runs a discovery protocol against it under a single deadline, and
//! closes the session before returning, whether the protocol succeeded or not.
//!
//! ```rust,no_run
//! # use snmp_discovery::{Gateway, GatewayConfig, Target};
//! # async fn example() -> snmp_discovery::Result<()> {
//! let gateway = Gateway::new(GatewayConfig::from_env());
//! let target = Target::new("192.0.2.1", "public", 161)?;
//!
//! let result = gateway.discover_interfaces(&target).await?;
//! for interface in &result.interfaces {
//!     println!("{} {} {}", interface.index, interface.name, interface.desc);
//! }
//! # Ok(())
//! # }
//! ```

mod bgp;
mod interfaces;
mod probe;
mod record;
mod tiers;

pub use bgp::decode_peer_address;
pub use record::{BgpDiscovery, BgpPeerRecord, InterfaceDiscovery, InterfaceRecord, PingReply};

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::mib;
use crate::session::Session;
use crate::target::Target;
use crate::timeout::Deadline;
use crate::transport::{Connector, UdpConnector};

use probe::Probe;

const OPEN_LABEL: &str = "SNMP session open timeout";

/// Runs discovery calls against devices.
///
/// A gateway holds only read-only configuration, so one instance can serve
/// any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct Gateway<C: Connector = UdpConnector> {
    config: GatewayConfig,
    connector: C,
}

impl Gateway {
    /// Gateway talking to devices over UDP.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_connector(config, UdpConnector)
    }
}

impl<C: Connector> Gateway<C> {
    /// Gateway opening its sessions through `connector`.
    pub fn with_connector(config: GatewayConfig, connector: C) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// List the interfaces of `target`.
    ///
    /// # Errors
    ///
    /// Fails when the session cannot be opened, when the device does not
    /// answer at all, or when the global timeout expires. A device that
    /// answers but has no interface data yields an empty list.
    pub async fn discover_interfaces(&self, target: &Target) -> Result<InterfaceDiscovery> {
        const OPERATION: &str = "interfaces";

        let deadline = Deadline::after(self.config.global_timeout);
        let session = self.open(target, deadline, OPERATION).await?;
        let result = {
            let probe = Probe::new(&session, &self.config, deadline);
            deadline
                .run(interfaces::discover(&probe), "SNMP interfaces timeout")
                .await
        };
        let interfaces = self.finish(session, target, deadline, OPERATION, result)?;

        tracing::info!(target: "snmp_discovery::discovery", { device = %target, count = interfaces.len(), elapsed = ?deadline.elapsed() }, "interface discovery complete");
        Ok(InterfaceDiscovery::new(target.host(), interfaces))
    }

    /// List the BGP peers of `target`, with the device's own AS number.
    ///
    /// The local AS is 0 when the device does not report it.
    ///
    /// # Errors
    ///
    /// As for [`discover_interfaces`](Self::discover_interfaces).
    pub async fn discover_bgp_peers(&self, target: &Target) -> Result<BgpDiscovery> {
        const OPERATION: &str = "bgp-peers";

        let deadline = Deadline::after(self.config.global_timeout);
        let session = self.open(target, deadline, OPERATION).await?;
        let result = {
            let probe = Probe::new(&session, &self.config, deadline);
            let discover = async {
                let local_asn = bgp::local_asn(&probe).await?;
                let peers = bgp::discover(&probe).await?;
                Ok::<_, Error>((local_asn, peers))
            };
            deadline.run(discover, "SNMP bgp-peers timeout").await
        };
        let (local_asn, peers) = self.finish(session, target, deadline, OPERATION, result)?;

        tracing::info!(target: "snmp_discovery::discovery", { device = %target, local_asn, count = peers.len(), elapsed = ?deadline.elapsed() }, "bgp peer discovery complete");
        Ok(BgpDiscovery::new(target.host(), local_asn, peers))
    }

    /// Check that `target` answers, returning its `sysName`.
    ///
    /// Bounded by the step timeout rather than the global one.
    pub async fn ping(&self, target: &Target) -> Result<PingReply> {
        const OPERATION: &str = "ping";

        let deadline = Deadline::after(self.config.step_timeout);
        let session = self.open(target, deadline, OPERATION).await?;
        let oids = [mib::sys_name()];
        let result = deadline.run(session.get(&oids), "SNMP ping timeout").await;
        let varbinds = self.finish(session, target, deadline, OPERATION, result)?;

        let sys_name = varbinds
            .into_iter()
            .next()
            .map(|vb| vb.value.to_text())
            .unwrap_or_default();
        tracing::info!(target: "snmp_discovery::discovery", { device = %target, sys_name = %sys_name }, "ping ok");
        Ok(PingReply { ok: true, sys_name })
    }

    /// Open a session to `target` within `deadline`.
    async fn open(
        &self,
        target: &Target,
        deadline: Deadline,
        operation: &'static str,
    ) -> Result<Session<C::Transport>> {
        tracing::debug!(target: "snmp_discovery::discovery", { device = %target, operation, limit = ?deadline.limit() }, "opening session");

        let open = Session::builder(target.clone())
            .options(self.config.session)
            .connect_with(&self.connector);
        deadline.run(open, OPEN_LABEL).await.inspect_err(|e| {
            tracing::warn!(target: "snmp_discovery::discovery", { device = %target, operation, class = e.class().as_str(), error = %e }, "session open failed");
        })
    }

    /// Close `session`, whatever the outcome of the call.
    fn finish<R>(
        &self,
        session: Session<C::Transport>,
        target: &Target,
        deadline: Deadline,
        operation: &'static str,
        result: Result<R>,
    ) -> Result<R> {
        session.close();
        result.inspect_err(|e| {
            tracing::warn!(target: "snmp_discovery::discovery", { device = %target, operation, class = e.class().as_str(), error = %e, elapsed = ?deadline.elapsed() }, "discovery failed");
        })
    }
}
