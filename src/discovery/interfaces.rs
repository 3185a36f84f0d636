//! Interface discovery.
//!
//! Three strategies, cheapest first:
//!
//! 1. walk `ifName`, then enrich its rows from `ifAlias`, `ifDescr` and
//!    `ifType`
//! 2. column-wise GETBULK of `ifTable` and `ifXTable`, rows from either
//! 3. independent walks of all five columns, rows from any of them plus the
//!    values of `ifIndex`
//!
//! Whatever the strategy, every row key yields exactly one record and the
//! record's index is the row key itself.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::Result;
use crate::mib::{self, if_table, if_x_table};
use crate::table::{Column, RowKey, union_keys};
use crate::transport::Transport;

use super::probe::Probe;
use super::record::InterfaceRecord;
use super::tiers::run_tiers;

const ENRICH_LABEL: &str = "SNMP interface enrich timeout";
const TABLE_LABEL: &str = "SNMP interfaces timeout";
const FALLBACK_LABEL: &str = "SNMP interfaces fallback timeout";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InterfaceTier {
    IfNameWalk,
    TableColumns,
    SubtreeUnion,
}

impl InterfaceTier {
    pub(crate) const ORDER: [InterfaceTier; 3] = [
        InterfaceTier::IfNameWalk,
        InterfaceTier::TableColumns,
        InterfaceTier::SubtreeUnion,
    ];
}

impl fmt::Display for InterfaceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InterfaceTier::IfNameWalk => "ifName-walk",
            InterfaceTier::TableColumns => "table-columns",
            InterfaceTier::SubtreeUnion => "subtree-union",
        })
    }
}

pub(crate) async fn discover<T: Transport>(probe: &Probe<'_, T>) -> Result<Vec<InterfaceRecord>> {
    run_tiers(
        "interfaces",
        &InterfaceTier::ORDER,
        probe.deadline(),
        |tier| attempt(probe, tier),
    )
    .await
}

async fn attempt<T: Transport>(
    probe: &Probe<'_, T>,
    tier: InterfaceTier,
) -> Result<Vec<InterfaceRecord>> {
    match tier {
        InterfaceTier::IfNameWalk => by_if_name(probe).await,
        InterfaceTier::TableColumns => by_table_columns(probe).await,
        InterfaceTier::SubtreeUnion => by_subtree_union(probe).await,
    }
}

async fn by_if_name<T: Transport>(probe: &Probe<'_, T>) -> Result<Vec<InterfaceRecord>> {
    let names = probe
        .walk(&mib::if_name(), "SNMP ifName subtree timeout")
        .await?;
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let (if_alias, if_descr, if_type) = (mib::if_alias(), mib::if_descr(), mib::if_type());
    let (aliases, descrs, types) = tokio::join!(
        probe.walk_or_empty(&if_alias, ENRICH_LABEL, "ifAlias"),
        probe.walk_or_empty(&if_descr, ENRICH_LABEL, "ifDescr"),
        probe.walk_or_empty(&if_type, ENRICH_LABEL, "ifType"),
    );
    let columns = Columns {
        names,
        aliases: aliases?,
        descrs: descrs?,
        types: types?,
    };
    columns.log(probe, InterfaceTier::IfNameWalk);

    let keys: BTreeSet<RowKey> = columns.names.keys().cloned().collect();
    Ok(columns.records(keys))
}

async fn by_table_columns<T: Transport>(probe: &Probe<'_, T>) -> Result<Vec<InterfaceRecord>> {
    let (if_entry, if_x_entry) = (mib::if_entry(), mib::if_x_entry());
    let (if_table, if_x_table) = tokio::join!(
        probe.table_or_empty(
            &if_entry,
            &[if_table::IF_INDEX, if_table::IF_DESCR, if_table::IF_TYPE],
            TABLE_LABEL,
            "ifTable",
        ),
        probe.table_or_empty(
            &if_x_entry,
            &[if_x_table::IF_NAME, if_x_table::IF_ALIAS],
            TABLE_LABEL,
            "ifXTable",
        ),
    );
    let (if_table, if_x_table) = (if_table?, if_x_table?);

    let keys: BTreeSet<RowKey> = if_table.keys().chain(if_x_table.keys()).cloned().collect();
    let columns = Columns {
        names: if_x_table.column(if_x_table::IF_NAME),
        aliases: if_x_table.column(if_x_table::IF_ALIAS),
        descrs: if_table.column(if_table::IF_DESCR),
        types: if_table.column(if_table::IF_TYPE),
    };
    columns.log(probe, InterfaceTier::TableColumns);

    Ok(columns.records(keys))
}

async fn by_subtree_union<T: Transport>(probe: &Probe<'_, T>) -> Result<Vec<InterfaceRecord>> {
    let roots = (
        mib::if_index(),
        mib::if_descr(),
        mib::if_type(),
        mib::if_name(),
        mib::if_alias(),
    );
    let (indices, descrs, types, names, aliases) = tokio::join!(
        probe.walk_or_empty(&roots.0, FALLBACK_LABEL, "ifIndex"),
        probe.walk_or_empty(&roots.1, FALLBACK_LABEL, "ifDescr"),
        probe.walk_or_empty(&roots.2, FALLBACK_LABEL, "ifType"),
        probe.walk_or_empty(&roots.3, FALLBACK_LABEL, "ifName"),
        probe.walk_or_empty(&roots.4, FALLBACK_LABEL, "ifAlias"),
    );
    let indices = indices?;
    let columns = Columns {
        names: names?,
        aliases: aliases?,
        descrs: descrs?,
        types: types?,
    };
    columns.log(probe, InterfaceTier::SubtreeUnion);

    let mut keys = union_keys([
        &columns.names,
        &columns.aliases,
        &columns.descrs,
        &columns.types,
    ]);
    // An ifIndex cell names its row by value; the OID suffix only stands in
    // when the value is not a usable index.
    keys.extend(indices.iter().map(|(key, value)| {
        value
            .as_i64()
            .and_then(RowKey::from_index)
            .unwrap_or_else(|| key.clone())
    }));

    Ok(columns.records(keys))
}

/// The per-row inputs of an interface record.
struct Columns {
    names: Column,
    aliases: Column,
    descrs: Column,
    types: Column,
}

impl Columns {
    fn log<T: Transport>(&self, probe: &Probe<'_, T>, tier: InterfaceTier) {
        tracing::debug!(
            target: "snmp_discovery::discovery",
            {
                peer = %probe.peer(),
                %tier,
                if_name = self.names.len(),
                if_alias = self.aliases.len(),
                if_descr = self.descrs.len(),
                if_type = self.types.len(),
            },
            "interface columns fetched"
        );
    }

    fn records(&self, keys: BTreeSet<RowKey>) -> Vec<InterfaceRecord> {
        keys.into_iter().map(|key| self.record(&key)).collect()
    }

    fn record(&self, key: &RowKey) -> InterfaceRecord {
        let descr = self.descrs.text(key);
        InterfaceRecord {
            index: key.to_string(),
            name: self
                .names
                .text(key)
                .or_else(|| descr.clone())
                .unwrap_or_default(),
            desc: self.aliases.text(key).or(descr).unwrap_or_default(),
            if_type: self.types.integer(key).unwrap_or(0),
        }
    }
}
