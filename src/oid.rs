//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for common OIDs.

use crate::error::{Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of arcs (subidentifiers) allowed in an OID.
///
/// Per RFC 2578 Section 3.5: "there are at most 128 sub-identifiers in a value".
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
///
/// Stored as a sequence of arc values (u32). Ordering is lexicographic by arc,
/// which is the order agents return OIDs in during a walk.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_discovery::oid::Oid;
    ///
    /// let oid = Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 5, 0]);
    /// assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.5.0");
    /// ```
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted string notation (e.g., "1.3.6.1.2.1.1.1.0").
    ///
    /// A single leading dot is accepted (`.1.3.6.1`), as net-snmp tools print it.
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_discovery::oid::Oid;
    ///
    /// let oid = Oid::parse(".1.3.6.1.2.1.31.1.1.1.1").unwrap();
    /// assert_eq!(oid.len(), 11);
    ///
    /// assert!(Oid::parse("").is_err());
    /// assert!(Oid::parse("1.3..6").is_err());
    /// assert!(Oid::parse("1.3.x").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::new();
        for part in body.split('.') {
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }

        let oid = Self { arcs };
        oid.validate_length()?;
        Ok(oid)
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with another OID.
    ///
    /// An OID always starts with itself, and any OID starts with an empty OID.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.len() >= other.arcs.len() && self.arcs[..other.arcs.len()] == other.arcs[..]
    }

    /// Arcs following `prefix`, or `None` if this OID is not under `prefix`.
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_discovery::oid;
    ///
    /// let remote_addr = oid!(1, 3, 6, 1, 2, 1, 15, 3, 1, 7);
    /// let cell = oid!(1, 3, 6, 1, 2, 1, 15, 3, 1, 7, 10, 20, 0, 2);
    /// assert_eq!(cell.suffix(&remote_addr), Some(&[10, 20, 0, 2][..]));
    /// assert_eq!(remote_addr.suffix(&cell), None);
    /// ```
    pub fn suffix(&self, prefix: &Oid) -> Option<&[u32]> {
        if self.starts_with(prefix) {
            Some(&self.arcs[prefix.arcs.len()..])
        } else {
            None
        }
    }

    /// Get the parent OID (all arcs except the last).
    ///
    /// Returns `None` if the OID is empty.
    pub fn parent(&self) -> Option<Oid> {
        if self.arcs.is_empty() {
            None
        } else {
            Some(Oid {
                arcs: SmallVec::from_slice(&self.arcs[..self.arcs.len() - 1]),
            })
        }
    }

    /// Create a child OID by appending an arc.
    ///
    /// Used to address a table column below its entry OID.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Validate that the OID doesn't exceed the maximum arc count.
    pub fn validate_length(&self) -> Result<()> {
        if self.arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: self.arcs.len(),
                max: MAX_OID_LEN,
            }));
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Macro to create an OID from literal arcs.
///
/// # Examples
///
/// ```
/// use snmp_discovery::oid;
///
/// let if_name = oid!(1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1);
/// assert_eq!(if_name.to_string(), "1.3.6.1.2.1.31.1.1.1.1");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let oid = Oid::parse("1.3.6.1.2.1.1.5.0").unwrap();
        assert_eq!(oid.arcs(), &[1, 3, 6, 1, 2, 1, 1, 5, 0]);
    }

    #[test]
    fn test_parse_leading_dot_and_whitespace() {
        let oid = Oid::parse(" .1.3.6.1.2.1.15.2.0 ").unwrap();
        assert_eq!(oid, oid!(1, 3, 6, 1, 2, 1, 15, 2, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", ".", "1..3", "1.3.", "1.-3", "1.3.6.99999999999"] {
            let err = Oid::parse(input).unwrap_err();
            assert!(
                matches!(err, Error::InvalidOid { .. }),
                "{input:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_overlong() {
        let long = vec!["1"; MAX_OID_LEN + 1].join(".");
        let err = Oid::parse(&long).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOid {
                kind: OidErrorKind::TooManyArcs { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_display() {
        let oid = Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 7]);
        assert_eq!(oid.to_string(), "1.3.6.1.2.1.2.2.1.2.7");
    }

    #[test]
    fn test_starts_with_and_suffix() {
        let column = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 3);
        let cell = column.child(12);
        assert!(cell.starts_with(&column));
        assert!(!column.starts_with(&cell));
        assert_eq!(cell.suffix(&column), Some(&[12][..]));
        assert_eq!(column.suffix(&column), Some(&[][..]));
    }

    #[test]
    fn test_ordering_is_by_arc_not_text() {
        let two = oid!(1, 3, 6, 1, 2);
        let ten = oid!(1, 3, 6, 1, 10);
        assert!(two < ten);
        assert!(oid!(1, 3, 6, 1) < two);
    }

    #[test]
    fn test_parent() {
        let oid = oid!(1, 3, 6, 1, 2, 1, 1, 5, 0);
        assert_eq!(oid.parent().unwrap(), oid!(1, 3, 6, 1, 2, 1, 1, 5));
        assert!(Oid::empty().parent().is_none());
    }
}
