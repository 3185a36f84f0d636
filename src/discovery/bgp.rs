//! BGP peer discovery.
//!
//! The local AS is read first and defaults to 0 when unavailable. Peers come
//! from a column-wise fetch of `bgpPeerTable`, or, when that yields nothing,
//! from separate walks of the remote-address and remote-AS columns. Both
//! paths are enriched from the vendor description column when configured.

use std::fmt;

use crate::error::Result;
use crate::mib::{self, bgp_peer_table};
use crate::table::{Column, RowKey, union_keys};
use crate::transport::Transport;
use crate::value::Value;

use super::probe::Probe;
use super::record::BgpPeerRecord;
use super::tiers::run_tiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BgpTier {
    PeerTable,
    SubtreeWalk,
}

impl BgpTier {
    pub(crate) const ORDER: [BgpTier; 2] = [BgpTier::PeerTable, BgpTier::SubtreeWalk];
}

impl fmt::Display for BgpTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BgpTier::PeerTable => "peer-table",
            BgpTier::SubtreeWalk => "subtree-walk",
        })
    }
}

/// Read `bgpLocalAs.0`, 0 when the agent cannot say.
pub(crate) async fn local_asn<T: Transport>(probe: &Probe<'_, T>) -> Result<u32> {
    let value = probe
        .get(&mib::bgp_local_as(), "SNMP local AS timeout")
        .await;
    Ok(probe
        .absorb(value, "bgpLocalAs")?
        .and_then(|value| value.as_asn())
        .unwrap_or(0))
}

pub(crate) async fn discover<T: Transport>(probe: &Probe<'_, T>) -> Result<Vec<BgpPeerRecord>> {
    run_tiers("bgp-peers", &BgpTier::ORDER, probe.deadline(), |tier| {
        attempt(probe, tier)
    })
    .await
}

async fn attempt<T: Transport>(probe: &Probe<'_, T>, tier: BgpTier) -> Result<Vec<BgpPeerRecord>> {
    match tier {
        BgpTier::PeerTable => by_peer_table(probe).await,
        BgpTier::SubtreeWalk => by_subtree_walk(probe).await,
    }
}

async fn by_peer_table<T: Transport>(probe: &Probe<'_, T>) -> Result<Vec<BgpPeerRecord>> {
    let table = probe
        .table(
            &mib::bgp_peer_entry(),
            &[bgp_peer_table::REMOTE_ADDR, bgp_peer_table::REMOTE_AS],
            "SNMP bgp-peers timeout",
        )
        .await?;
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let columns = PeerColumns {
        addresses: table.column(bgp_peer_table::REMOTE_ADDR),
        asns: table.column(bgp_peer_table::REMOTE_AS),
        descriptions: descriptions(probe, "SNMP bgp-peers timeout").await?,
    };
    columns.log(probe, BgpTier::PeerTable);
    Ok(columns.records())
}

async fn by_subtree_walk<T: Transport>(probe: &Probe<'_, T>) -> Result<Vec<BgpPeerRecord>> {
    const LABEL: &str = "SNMP bgp-peers subtree fallback timeout";

    let (remote_addr, remote_as) = (mib::bgp_peer_remote_addr(), mib::bgp_peer_remote_as());
    let (addresses, asns, descriptions) = tokio::join!(
        probe.walk(&remote_addr, LABEL),
        probe.walk_or_empty(&remote_as, LABEL, "bgpPeerRemoteAs"),
        descriptions(probe, LABEL),
    );

    let columns = PeerColumns {
        addresses: addresses?,
        asns: asns?,
        descriptions: descriptions?,
    };
    columns.log(probe, BgpTier::SubtreeWalk);
    Ok(columns.records())
}

/// Best-effort walk of the configured description column.
async fn descriptions<T: Transport>(probe: &Probe<'_, T>, label: &'static str) -> Result<Column> {
    match probe.config().bgp_peer_description.as_ref() {
        Some(column) => probe.walk_or_empty(column, label, "peer descriptions").await,
        None => Ok(Column::empty()),
    }
}

struct PeerColumns {
    addresses: Column,
    asns: Column,
    descriptions: Column,
}

impl PeerColumns {
    fn log<T: Transport>(&self, probe: &Probe<'_, T>, tier: BgpTier) {
        tracing::debug!(
            target: "snmp_discovery::discovery",
            {
                peer = %probe.peer(),
                %tier,
                remote_addr = self.addresses.len(),
                remote_as = self.asns.len(),
                descriptions = self.descriptions.len(),
            },
            "bgp peer columns fetched"
        );
    }

    /// One record per row with a decodable remote address.
    fn records(&self) -> Vec<BgpPeerRecord> {
        union_keys([&self.addresses, &self.asns])
            .iter()
            .filter_map(|key| self.record(key))
            .collect()
    }

    fn record(&self, key: &RowKey) -> Option<BgpPeerRecord> {
        let ip = self
            .addresses
            .value(key)
            .and_then(decode_peer_address)?;
        let asn = self.asns.value(key).and_then(Value::as_asn).unwrap_or(0);
        let name = match self.descriptions.text(key) {
            Some(description) => description,
            None if asn != 0 => format!("AS{asn}"),
            None => String::new(),
        };
        Some(BgpPeerRecord { ip, asn, name })
    }
}

/// Render a `bgpPeerRemoteAddr` value as an address string.
///
/// Four bytes render as a dotted quad and sixteen as eight colon-separated
/// hex groups. Other lengths fall back to colon-separated hex octets. Empty
/// and non-octet values have no address.
///
/// # Examples
///
/// ```
/// use snmp_discovery::{discovery::decode_peer_address, value::Value};
///
/// assert_eq!(decode_peer_address(&Value::IpAddress([10, 20, 0, 2])).as_deref(), Some("10.20.0.2"));
/// assert_eq!(decode_peer_address(&Value::Integer(4)), None);
/// ```
pub fn decode_peer_address(value: &Value) -> Option<String> {
    let bytes = value.as_bytes()?;
    match bytes.len() {
        0 => None,
        4 => Some(format!("{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])),
        16 => Some(
            bytes
                .chunks_exact(2)
                .map(|pair| format!("{:04x}", u16::from_be_bytes([pair[0], pair[1]])))
                .collect::<Vec<_>>()
                .join(":"),
        ),
        _ => Some(
            bytes
                .iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<Vec<_>>()
                .join(":"),
        ),
    }
}
