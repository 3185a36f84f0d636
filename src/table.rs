//! OID-indexed table reconstruction.
//!
//! SNMP tables arrive as flat varbind sequences, one per column, where each
//! cell's OID is `<column OID>.<row index>`. This module turns those sequences
//! back into rows:
//!
//! - [`RowKey`] is the row index, i.e. every arc after the column prefix.
//!   Multi-arc indices (such as the peer address in `bgpPeerTable`) are kept
//!   whole.
//! - [`Column`] is one column keyed by row, built from a subtree walk or cut
//!   out of a [`Table`].
//! - [`Table`] is the row-major result of a column-wise table fetch.
//! - [`union_keys`] merges the row sets of independently fetched columns, so a
//!   row present in any source survives even when other sources lack it.
//!
//! Fields are then filled per row with an explicit preference order; a missing
//! column or cell defaults the field rather than dropping the row.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

/// Row index of a table cell: the OID arcs following the column prefix.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(Oid);

impl RowKey {
    /// Derive the row key of `oid` under `prefix`.
    ///
    /// Returns `None` when `oid` is not below `prefix` or has no index arcs,
    /// so unkeyable cells are dropped rather than producing empty keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_discovery::{oid, table::RowKey};
    ///
    /// let if_descr = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2);
    /// let key = RowKey::under(&if_descr, &if_descr.child(10101)).unwrap();
    /// assert_eq!(key.to_string(), "10101");
    ///
    /// assert!(RowKey::under(&if_descr, &if_descr).is_none());
    /// ```
    pub fn under(prefix: &Oid, oid: &Oid) -> Option<Self> {
        match oid.suffix(prefix) {
            Some(arcs) if !arcs.is_empty() => Some(Self(Oid::from_slice(arcs))),
            _ => None,
        }
    }

    /// Single-arc key for an integer index value such as `ifIndex`.
    ///
    /// Returns `None` for values outside the unsigned 32-bit range.
    pub fn from_index(index: i64) -> Option<Self> {
        u32::try_from(index).ok().map(|arc| Self(Oid::from_slice(&[arc])))
    }

    /// The index arcs.
    pub fn arcs(&self) -> &[u32] {
        self.0.arcs()
    }

    pub fn as_oid(&self) -> &Oid {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowKey({})", self.0)
    }
}

/// One table column keyed by row.
///
/// Exception values (`noSuchInstance` and friends) are not stored: a cell the
/// agent could not supply is the same as a missing cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    cells: BTreeMap<RowKey, Value>,
}

impl Column {
    /// An empty column, used for fetches that failed or were unsupported.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Key the varbinds of a subtree walk of `prefix` by row.
    ///
    /// Later duplicates of a row replace earlier ones.
    pub fn from_varbinds(prefix: &Oid, varbinds: &[VarBind]) -> Self {
        let cells = varbinds
            .iter()
            .filter(|vb| !vb.value.is_exception())
            .filter_map(|vb| RowKey::under(prefix, &vb.oid).map(|key| (key, vb.value.clone())))
            .collect();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RowKey> {
        self.cells.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, &Value)> {
        self.cells.iter()
    }

    /// Raw value of the cell at `key`.
    pub fn value(&self, key: &RowKey) -> Option<&Value> {
        self.cells.get(key)
    }

    /// Rendered text of the cell at `key`, if present and non-empty.
    pub fn text(&self, key: &RowKey) -> Option<String> {
        self.value(key)
            .map(Value::to_text)
            .filter(|text| !text.is_empty())
    }

    /// Numeric value of the cell at `key`.
    pub fn integer(&self, key: &RowKey) -> Option<i64> {
        self.value(key).and_then(Value::as_i64)
    }
}

/// Cells of one table row, by column number.
pub type Row = BTreeMap<u32, VarBind>;

/// Result of a column-wise table fetch: row key to column number to cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: BTreeMap<RowKey, Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from per-column walks below `entry`.
    ///
    /// Each `(column, varbinds)` pair is keyed against `entry.column`.
    pub fn from_columns<'a>(
        entry: &Oid,
        columns: impl IntoIterator<Item = (u32, &'a [VarBind])>,
    ) -> Self {
        let mut table = Self::new();
        for (column, varbinds) in columns {
            let prefix = entry.child(column);
            for vb in varbinds {
                if vb.value.is_exception() {
                    continue;
                }
                if let Some(key) = RowKey::under(&prefix, &vb.oid) {
                    table.insert(key, column, vb.clone());
                }
            }
        }
        table
    }

    /// Store `cell` as column `column` of row `key`.
    pub fn insert(&mut self, key: RowKey, column: u32, cell: VarBind) {
        self.rows.entry(key).or_default().insert(column, cell);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, key: &RowKey) -> Option<&Row> {
        self.rows.get(key)
    }

    pub fn cell(&self, key: &RowKey, column: u32) -> Option<&VarBind> {
        self.rows.get(key).and_then(|row| row.get(&column))
    }

    pub fn rows(&self) -> impl Iterator<Item = (&RowKey, &Row)> {
        self.rows.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RowKey> {
        self.rows.keys()
    }

    /// Cut one column out of the table.
    pub fn column(&self, column: u32) -> Column {
        let cells = self
            .rows
            .iter()
            .filter_map(|(key, row)| row.get(&column).map(|vb| (key.clone(), vb.value.clone())))
            .collect();
        Column { cells }
    }
}

/// Union of the row keys of every column, in index order.
///
/// # Examples
///
/// ```
/// use snmp_discovery::{oid, table::{union_keys, Column}, value::Value, varbind::VarBind};
///
/// let if_name = oid!(1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1);
/// let if_descr = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2);
/// let names = Column::from_varbinds(&if_name, &[VarBind::new(if_name.child(1), Value::from("Gi0/1"))]);
/// let descrs = Column::from_varbinds(&if_descr, &[VarBind::new(if_descr.child(2), Value::from("Null0"))]);
///
/// let keys: Vec<String> = union_keys([&names, &descrs]).iter().map(|k| k.to_string()).collect();
/// assert_eq!(keys, ["1", "2"]);
/// ```
pub fn union_keys<'a>(columns: impl IntoIterator<Item = &'a Column>) -> BTreeSet<RowKey> {
    columns
        .into_iter()
        .flat_map(|column| column.keys().cloned())
        .collect()
}
