//! SNMP value types.
//!
//! The `Value` enum is the owned form of every value the transport hands back,
//! including the SNMPv2 exception markers.

use crate::oid::Oid;
use bytes::Bytes;

/// SNMP value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// INTEGER. Held as `i64` so unsigned 32-bit values reported through
    /// INTEGER syntax by lenient agents survive unchanged.
    Integer(i64),

    /// OCTET STRING (arbitrary bytes).
    OctetString(Bytes),

    /// NULL
    Null,

    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),

    /// IpAddress (4 bytes, big-endian)
    IpAddress([u8; 4]),

    /// Counter32 (unsigned 32-bit, wrapping)
    Counter32(u32),

    /// Gauge32 / Unsigned32 (unsigned 32-bit, non-wrapping)
    Gauge32(u32),

    /// TimeTicks (hundredths of seconds)
    TimeTicks(u32),

    /// Opaque (legacy, arbitrary bytes)
    Opaque(Bytes),

    /// Counter64 (unsigned 64-bit, wrapping). SNMPv2c only.
    Counter64(u64),

    /// noSuchObject exception.
    NoSuchObject,

    /// noSuchInstance exception.
    NoSuchInstance,

    /// endOfMibView exception - the normal termination of a walk.
    EndOfMibView,
}

impl Value {
    /// Numeric view of the value.
    ///
    /// Returns `Some` for INTEGER and the unsigned SMIv2 numeric types.
    /// Counter64 values above `i64::MAX` return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_discovery::value::Value;
    ///
    /// assert_eq!(Value::Integer(6).as_i64(), Some(6));
    /// assert_eq!(Value::Gauge32(1_000_000_000).as_i64(), Some(1_000_000_000));
    /// assert_eq!(Value::OctetString("6".into()).as_i64(), None);
    /// ```
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(i64::from(*v)),
            Value::Counter64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Raw bytes of an OCTET STRING, Opaque or IpAddress value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(b) | Value::Opaque(b) => Some(b),
            Value::IpAddress(b) => Some(b),
            _ => None,
        }
    }

    /// Check if this is an SNMPv2 exception marker.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Interpret the value as an autonomous system number.
    ///
    /// BGP4-MIB declares AS numbers as INTEGER, so agents that report 4-byte
    /// ASNs above `i32::MAX` send them as negative numbers. Those are
    /// reinterpreted as unsigned 32-bit.
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_discovery::value::Value;
    ///
    /// assert_eq!(Value::Integer(269077).as_asn(), Some(269077));
    /// assert_eq!(Value::Integer(-94967296).as_asn(), Some(4_200_000_000));
    /// assert_eq!(Value::Gauge32(65001).as_asn(), Some(65001));
    /// assert_eq!(Value::Null.as_asn(), None);
    /// ```
    pub fn as_asn(&self) -> Option<u32> {
        match self {
            Value::Integer(v) if *v < 0 => i32::try_from(*v).ok().map(|n| n as u32),
            Value::Integer(v) => u32::try_from(*v).ok(),
            Value::Counter32(v) | Value::Gauge32(v) => Some(*v),
            _ => None,
        }
    }

    /// Render the value as display text.
    ///
    /// Strings are decoded as UTF-8 (lossily) with trailing NUL padding
    /// removed, numbers print in decimal, and NULL or exception values render
    /// as the empty string so they never count as "present".
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_discovery::value::Value;
    ///
    /// assert_eq!(Value::OctetString("Gi0/1\0\0".into()).to_text(), "Gi0/1");
    /// assert_eq!(Value::Integer(117).to_text(), "117");
    /// assert_eq!(Value::NoSuchInstance.to_text(), "");
    /// ```
    pub fn to_text(&self) -> String {
        match self {
            Value::OctetString(b) | Value::Opaque(b) => {
                let end = b.iter().rposition(|&c| c != 0).map_or(0, |i| i + 1);
                String::from_utf8_lossy(&b[..end]).into_owned()
            }
            Value::Integer(v) => v.to_string(),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => v.to_string(),
            Value::Counter64(v) => v.to_string(),
            Value::IpAddress([a, b, c, d]) => format!("{a}.{b}.{c}.{d}"),
            Value::ObjectIdentifier(oid) => oid.to_string(),
            Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {
                String::new()
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "INTEGER: {v}"),
            Value::OctetString(_) => write!(f, "STRING: \"{}\"", self.to_text()),
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "OID: {oid}"),
            Value::IpAddress(_) => write!(f, "IpAddress: {}", self.to_text()),
            Value::Counter32(v) => write!(f, "Counter32: {v}"),
            Value::Gauge32(v) => write!(f, "Gauge32: {v}"),
            Value::TimeTicks(v) => write!(f, "Timeticks: ({v})"),
            Value::Opaque(b) => write!(f, "Opaque: {} bytes", b.len()),
            Value::Counter64(v) => write!(f, "Counter64: {v}"),
            Value::NoSuchObject => write!(f, "No Such Object available"),
            Value::NoSuchInstance => write!(f, "No Such Instance currently exists"),
            Value::EndOfMibView => write!(f, "No more variables left in this MIB View"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}
