//! Deadline-bounded reads for discovery protocols.

use std::net::SocketAddr;

use crate::config::GatewayConfig;
use crate::error::Result;
use crate::oid::Oid;
use crate::session::Session;
use crate::table::{Column, Table};
use crate::timeout::Deadline;
use crate::transport::Transport;
use crate::value::Value;

/// One discovery call's view of its session.
///
/// Every read goes through the call's [`Deadline`], so no protocol step can
/// outlive the global timeout. The `*_or_empty` variants absorb failures of
/// optional fetches, except once the deadline has expired: at that point the
/// call is over and the expiry propagates.
pub(crate) struct Probe<'a, T: Transport> {
    session: &'a Session<T>,
    config: &'a GatewayConfig,
    deadline: Deadline,
}

impl<'a, T: Transport> Probe<'a, T> {
    pub(crate) fn new(
        session: &'a Session<T>,
        config: &'a GatewayConfig,
        deadline: Deadline,
    ) -> Self {
        Self {
            session,
            config,
            deadline,
        }
    }

    pub(crate) fn config(&self) -> &GatewayConfig {
        self.config
    }

    pub(crate) fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    pub(crate) fn peer(&self) -> SocketAddr {
        self.session.peer_addr()
    }

    /// Walk `root` and key the result by row.
    pub(crate) async fn walk(&self, root: &Oid, label: &'static str) -> Result<Column> {
        let rows = self
            .deadline
            .run(self.session.walk_subtree(root), label)
            .await?;
        Ok(Column::from_varbinds(root, &rows))
    }

    /// [`walk`](Self::walk), with failures other than deadline expiry
    /// treated as an empty column.
    pub(crate) async fn walk_or_empty(
        &self,
        root: &Oid,
        label: &'static str,
        what: &'static str,
    ) -> Result<Column> {
        self.absorb(self.walk(root, label).await, what)
    }

    /// Fetch `columns` of the table below `entry`.
    pub(crate) async fn table(
        &self,
        entry: &Oid,
        columns: &[u32],
        label: &'static str,
    ) -> Result<Table> {
        let fetch = self
            .session
            .table_columns(entry, columns, self.config.max_repetitions);
        self.deadline.run(fetch, label).await
    }

    /// [`table`](Self::table), with failures other than deadline expiry
    /// treated as an empty table.
    pub(crate) async fn table_or_empty(
        &self,
        entry: &Oid,
        columns: &[u32],
        label: &'static str,
        what: &'static str,
    ) -> Result<Table> {
        self.absorb(self.table(entry, columns, label).await, what)
    }

    /// GET a single object, bounded by the step timeout.
    ///
    /// Returns `None` when the agent has no value for it.
    pub(crate) async fn get(&self, oid: &Oid, label: &'static str) -> Result<Option<Value>> {
        let oids = std::slice::from_ref(oid);
        let varbinds = self
            .deadline
            .run_step(self.session.get(oids), self.config.step_timeout, label)
            .await?;
        Ok(varbinds
            .into_iter()
            .next()
            .map(|vb| vb.value)
            .filter(|value| !value.is_exception() && *value != Value::Null))
    }

    /// Turn a failed optional fetch into its empty default.
    pub(crate) fn absorb<V: Default>(&self, result: Result<V>, what: &'static str) -> Result<V> {
        match result {
            Ok(value) => Ok(value),
            Err(e) if self.deadline.is_expired() => Err(e),
            Err(e) => {
                tracing::debug!(target: "snmp_discovery::discovery", { peer = %self.peer(), fetch = what, error = %e }, "optional fetch failed, using empty result");
                Ok(V::default())
            }
        }
    }
}
