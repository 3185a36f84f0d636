#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use snmp_discovery::Value;
use snmp_discovery::discovery::decode_peer_address;

fuzz_target!(|data: &[u8]| {
    let value = Value::OctetString(Bytes::copy_from_slice(data));
    match decode_peer_address(&value) {
        None => assert!(data.is_empty()),
        Some(text) => assert!(!text.is_empty()),
    }
});
