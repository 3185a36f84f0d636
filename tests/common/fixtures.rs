//! Common test fixtures and constants.

use super::Device;
use bytes::Bytes;
use snmp_discovery::{Gateway, GatewayConfig, Target, Value, mib};

// =============================================================================
// Targets
// =============================================================================

pub const COMMUNITY: &str = "public";

pub fn target() -> Target {
    Target::new("192.0.2.1", COMMUNITY, 161).unwrap()
}

pub fn gateway(device: &Device) -> Gateway<Device> {
    Gateway::with_connector(GatewayConfig::default(), device.clone())
}

pub fn gateway_with(device: &Device, config: GatewayConfig) -> Gateway<Device> {
    Gateway::with_connector(config, device.clone())
}

pub fn text(s: &str) -> Value {
    Value::from(s)
}

pub fn octets(bytes: &[u8]) -> Value {
    Value::OctetString(Bytes::copy_from_slice(bytes))
}

// =============================================================================
// Interface fixtures
// =============================================================================

/// ifTable rows: (ifIndex, ifDescr, ifType).
pub const IF_TABLE: &[(u32, &str, i64)] = &[
    (1, "GigabitEthernet0/0/0", 6),
    (2, "GigabitEthernet0/0/1", 6),
    (3, "Loopback0", 24),
];

/// ifXTable rows: (ifIndex, ifName, ifAlias).
pub const IF_X_TABLE: &[(u32, &str, &str)] = &[
    (1, "Gi0/0/0", "uplink to core-2"),
    (2, "Gi0/0/1", ""),
    (3, "Lo0", "router-id"),
];

/// Populate ifTable.
pub fn with_if_table(device: &Device) {
    for &(index, descr, if_type) in IF_TABLE {
        device
            .set(mib::if_index().child(index), Value::Integer(i64::from(index)))
            .set(mib::if_descr().child(index), text(descr))
            .set(mib::if_type().child(index), Value::Integer(if_type));
    }
}

/// Populate ifXTable.
pub fn with_if_x_table(device: &Device) {
    for &(index, name, alias) in IF_X_TABLE {
        device
            .set(mib::if_name().child(index), text(name))
            .set(mib::if_alias().child(index), text(alias));
    }
}

// =============================================================================
// BGP fixtures
// =============================================================================

pub const LOCAL_AS: i64 = 65000;

/// bgpPeerTable rows: (peer address, remote AS, description).
pub const PEERS: &[([u8; 4], i64, &str)] = &[
    ([10, 20, 0, 2], 65001, "transit-a"),
    ([10, 20, 0, 6], 65002, ""),
    ([192, 0, 2, 77], 269077, ""),
];

pub fn with_local_as(device: &Device) {
    device.set(mib::bgp_local_as(), Value::Integer(LOCAL_AS));
}

/// Populate bgpPeerTable, descriptions included.
pub fn with_peer_table(device: &Device) {
    for &(addr, asn, descr) in PEERS {
        let index = addr.map(u32::from);
        device
            .column_indexed(&mib::bgp_peer_remote_addr(), &[(&index[..], Value::IpAddress(addr))])
            .column_indexed(&mib::bgp_peer_remote_as(), &[(&index[..], Value::Integer(asn))]);
        if !descr.is_empty() {
            device.column_indexed(&mib::bgp_peer_description(), &[(&index[..], text(descr))]);
        }
    }
}

// =============================================================================
// Whole devices
// =============================================================================

pub fn sys_name(device: &Device, name: &str) {
    device.set(mib::sys_name(), text(name));
}

/// A router implementing everything discovery reads.
pub fn router() -> Device {
    let device = Device::new();
    sys_name(&device, "core-1");
    with_if_table(&device);
    with_if_x_table(&device);
    with_local_as(&device);
    with_peer_table(&device);
    device
}
