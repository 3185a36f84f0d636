//! MIB objects read during discovery.
//!
//! IF-MIB (RFC 2863), BGP4-MIB (RFC 4273) and SNMPv2-MIB (RFC 3418).

use crate::oid;
use crate::oid::Oid;

/// `sysName.0`
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}

/// `ifEntry`, the row of `ifTable`.
pub fn if_entry() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2, 2, 1)
}

/// `ifXEntry`, the row of `ifXTable`.
pub fn if_x_entry() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 31, 1, 1, 1)
}

/// `ifTable` column numbers.
pub mod if_table {
    pub const IF_INDEX: u32 = 1;
    pub const IF_DESCR: u32 = 2;
    pub const IF_TYPE: u32 = 3;
}

/// `ifXTable` column numbers.
pub mod if_x_table {
    pub const IF_NAME: u32 = 1;
    pub const IF_ALIAS: u32 = 18;
}

pub fn if_index() -> Oid {
    if_entry().child(if_table::IF_INDEX)
}

pub fn if_descr() -> Oid {
    if_entry().child(if_table::IF_DESCR)
}

pub fn if_type() -> Oid {
    if_entry().child(if_table::IF_TYPE)
}

pub fn if_name() -> Oid {
    if_x_entry().child(if_x_table::IF_NAME)
}

pub fn if_alias() -> Oid {
    if_x_entry().child(if_x_table::IF_ALIAS)
}

/// `bgpLocalAs.0`
pub fn bgp_local_as() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 15, 2, 0)
}

/// `bgpPeerEntry`, the row of `bgpPeerTable`.
pub fn bgp_peer_entry() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 15, 3, 1)
}

/// `bgpPeerTable` column numbers.
pub mod bgp_peer_table {
    pub const REMOTE_ADDR: u32 = 7;
    pub const REMOTE_AS: u32 = 9;
    /// Column 18 is not part of RFC 4273; several vendors place a peer
    /// description there.
    pub const DESCRIPTION: u32 = 18;
}

pub fn bgp_peer_remote_addr() -> Oid {
    bgp_peer_entry().child(bgp_peer_table::REMOTE_ADDR)
}

pub fn bgp_peer_remote_as() -> Oid {
    bgp_peer_entry().child(bgp_peer_table::REMOTE_AS)
}

/// Default location of the vendor peer-description column.
pub fn bgp_peer_description() -> Oid {
    bgp_peer_entry().child(bgp_peer_table::DESCRIPTION)
}
