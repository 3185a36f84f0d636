#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_discovery::oid::Oid;
use snmp_discovery::table::RowKey;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(oid) = Oid::parse(s) else {
        return;
    };

    // Whatever parses must print and parse back to itself.
    let again = Oid::parse(&oid.to_string()).expect("displayed OID reparses");
    assert_eq!(again, oid);

    // Any prefix of a parsed OID yields a row key for the remainder.
    let prefix = Oid::from_slice(&oid.arcs()[..oid.len() / 2]);
    if let Some(key) = RowKey::under(&prefix, &oid) {
        assert_eq!(key.arcs(), &oid.arcs()[prefix.len()..]);
    }
});
