//! Discovery results.
//!
//! Field names serialize in the camelCase JSON shape REST callers consume.

use serde::Serialize;

/// One interface of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceRecord {
    /// SNMP table index of the interface, unique within one result.
    pub index: String,
    /// `ifName`, falling back to `ifDescr`.
    pub name: String,
    /// `ifAlias`, falling back to `ifDescr`.
    pub desc: String,
    /// IANA ifType, 0 when unknown.
    #[serde(rename = "type")]
    pub if_type: i64,
}

/// One BGP peering session of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BgpPeerRecord {
    /// Remote peer address, never empty.
    pub ip: String,
    /// Remote AS number, 0 when unreadable.
    pub asn: u32,
    /// Vendor description, else `AS<asn>`, else empty.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceDiscovery {
    pub device: String,
    pub interfaces: Vec<InterfaceRecord>,
    pub count: usize,
}

impl InterfaceDiscovery {
    pub fn new(device: impl Into<String>, interfaces: Vec<InterfaceRecord>) -> Self {
        Self {
            device: device.into(),
            count: interfaces.len(),
            interfaces,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BgpDiscovery {
    pub device: String,
    pub local_asn: u32,
    pub peers: Vec<BgpPeerRecord>,
    pub count: usize,
}

impl BgpDiscovery {
    pub fn new(device: impl Into<String>, local_asn: u32, peers: Vec<BgpPeerRecord>) -> Self {
        Self {
            device: device.into(),
            local_asn,
            count: peers.len(),
            peers,
        }
    }
}

/// Liveness probe answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingReply {
    pub ok: bool,
    pub sys_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interface_payload_shape() {
        let result = InterfaceDiscovery::new(
            "10.0.0.1",
            vec![InterfaceRecord {
                index: "1".into(),
                name: "Gi0/1".into(),
                desc: "uplink".into(),
                if_type: 6,
            }],
        );
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "device": "10.0.0.1",
                "interfaces": [{"index": "1", "name": "Gi0/1", "desc": "uplink", "type": 6}],
                "count": 1
            })
        );
    }

    #[test]
    fn bgp_payload_shape() {
        let result = BgpDiscovery::new(
            "10.0.0.1",
            65000,
            vec![BgpPeerRecord {
                ip: "10.20.0.2".into(),
                asn: 269077,
                name: "AS269077".into(),
            }],
        );
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "device": "10.0.0.1",
                "localAsn": 65000,
                "peers": [{"ip": "10.20.0.2", "asn": 269077, "name": "AS269077"}],
                "count": 1
            })
        );
    }

    #[test]
    fn ping_payload_shape() {
        let reply = PingReply {
            ok: true,
            sys_name: "core-1".into(),
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"ok": true, "sysName": "core-1"})
        );
    }
}
