//! Subtree walks.

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::transport::Transport;
use crate::value::Value;
use crate::varbind::VarBind;

use super::Session;

impl<T: Transport> Session<T> {
    /// Collect every varbind under `root` using GETNEXT.
    ///
    /// The walk ends at `endOfMibView`, at the first OID outside `root`, or,
    /// on SNMPv1, at a `noSuchName` error. An empty subtree yields an empty
    /// list, not an error.
    ///
    /// # Errors
    ///
    /// Request failures propagate unchanged. An agent that returns an OID not
    /// greater than the previous one fails the walk with
    /// [`Error::NonIncreasingOid`] instead of looping forever.
    pub async fn walk_subtree(&self, root: &Oid) -> Result<Vec<VarBind>> {
        let mut rows = Vec::new();
        let mut cursor = root.clone();

        loop {
            let response = match self.get_next(&cursor).await {
                Ok(response) => response,
                Err(e) if self.is_v1_end_of_view(&e) => break,
                Err(e) => return Err(e),
            };

            let Some(vb) = response.into_iter().next() else {
                break;
            };

            if matches!(vb.value, Value::EndOfMibView) || !vb.oid.starts_with(root) {
                break;
            }

            if vb.oid <= cursor {
                tracing::debug!(target: "snmp_discovery::session", { peer = %self.peer_addr(), previous = %cursor, current = %vb.oid }, "non-increasing OID in walk");
                return Err(Error::NonIncreasingOid {
                    previous: cursor,
                    current: vb.oid,
                });
            }

            cursor = vb.oid.clone();
            rows.push(vb);
        }

        tracing::trace!(target: "snmp_discovery::session", { peer = %self.peer_addr(), root = %root, rows = rows.len() }, "walk complete");
        Ok(rows)
    }
}
