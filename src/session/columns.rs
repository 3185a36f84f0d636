//! Column-wise table fetch.

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::table::{RowKey, Table};
use crate::transport::Transport;
use crate::value::Value;
use crate::varbind::VarBind;

use super::Session;

/// Progress of one requested column.
struct Cursor {
    column: u32,
    prefix: Oid,
    /// Last OID fetched for this column, `None` once the column is exhausted.
    position: Option<Oid>,
}

impl<T: Transport> Session<T> {
    /// Fetch `columns` of the table whose entry OID is `entry`.
    ///
    /// Each GETBULK round asks for the next `max_repetitions` rows of every
    /// column that is not yet exhausted. Rows are keyed by the OID suffix
    /// after `<entry>.<column>`. On SNMPv1, which has no GETBULK, each column
    /// is walked with GETNEXT instead.
    ///
    /// A table the agent does not implement comes back empty.
    pub async fn table_columns(
        &self,
        entry: &Oid,
        columns: &[u32],
        max_repetitions: u32,
    ) -> Result<Table> {
        if !self.version().supports_bulk() {
            return self.table_columns_by_walk(entry, columns).await;
        }

        let max_repetitions = max_repetitions.max(1);
        let mut cursors: Vec<Cursor> = columns
            .iter()
            .map(|&column| {
                let prefix = entry.child(column);
                Cursor {
                    column,
                    position: Some(prefix.clone()),
                    prefix,
                }
            })
            .collect();
        let mut table = Table::new();

        loop {
            let active: Vec<usize> = (0..cursors.len())
                .filter(|&i| cursors[i].position.is_some())
                .collect();
            if active.is_empty() {
                break;
            }

            let request: Vec<Oid> = active
                .iter()
                .filter_map(|&i| cursors[i].position.clone())
                .collect();
            let response = self.get_bulk(&request, 0, max_repetitions).await?;
            if response.is_empty() {
                break;
            }

            let mut progressed = false;
            // GETBULK answers row by row: varbind n belongs to request OID n % width.
            for (n, vb) in response.into_iter().enumerate() {
                let cursor = &mut cursors[active[n % active.len()]];
                if advance(cursor, vb, &mut table)? {
                    progressed = true;
                }
            }

            if !progressed {
                break;
            }
        }

        tracing::trace!(target: "snmp_discovery::session", { peer = %self.peer_addr(), entry = %entry, rows = table.len() }, "table fetch complete");
        Ok(table)
    }

    async fn table_columns_by_walk(&self, entry: &Oid, columns: &[u32]) -> Result<Table> {
        let mut walked = Vec::with_capacity(columns.len());
        for &column in columns {
            walked.push((column, self.walk_subtree(&entry.child(column)).await?));
        }
        Ok(Table::from_columns(
            entry,
            walked.iter().map(|(column, rows)| (*column, rows.as_slice())),
        ))
    }
}

/// Apply one returned varbind to its column cursor.
///
/// Returns whether the column advanced.
fn advance(cursor: &mut Cursor, vb: VarBind, table: &mut Table) -> Result<bool> {
    let Some(position) = cursor.position.as_ref() else {
        return Ok(false);
    };

    if matches!(vb.value, Value::EndOfMibView) || !vb.oid.starts_with(&cursor.prefix) {
        cursor.position = None;
        return Ok(false);
    }

    if vb.oid <= *position {
        return Err(Error::NonIncreasingOid {
            previous: position.clone(),
            current: vb.oid,
        });
    }

    cursor.position = Some(vb.oid.clone());
    if vb.value.is_exception() {
        return Ok(true);
    }
    match RowKey::under(&cursor.prefix, &vb.oid) {
        Some(key) => table.insert(key, cursor.column, vb),
        None => cursor.position = None,
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::oid;
    use crate::oid::Oid;
    use crate::session::{Session, SessionOptions};
    use crate::table::RowKey;
    use crate::transport::{MockRequest, MockTransport};
    use crate::value::Value;
    use crate::version::Version;

    fn mock() -> MockTransport {
        MockTransport::new("127.0.0.1:161".parse().unwrap())
    }

    fn if_entry() -> Oid {
        oid!(1, 3, 6, 1, 2, 1, 2, 2, 1)
    }

    fn cell(column: u32, row: u32) -> Oid {
        if_entry().child(column).child(row)
    }

    #[tokio::test]
    async fn test_columns_are_interleaved_by_row() {
        let mock = mock();
        mock.queue_varbinds([
            (cell(2, 1), Value::from("lo")),
            (cell(3, 1), Value::Integer(24)),
            (cell(2, 2), Value::from("eth0")),
            (cell(3, 2), Value::Integer(6)),
        ]);
        mock.queue_varbinds([
            (cell(3, 1), Value::Integer(24)),
            (cell(4, 1), Value::Integer(65536)),
        ]);

        let session = Session::new(mock.clone(), SessionOptions::default());
        let table = session.table_columns(&if_entry(), &[2, 3], 2).await.unwrap();

        assert_eq!(table.len(), 2);
        let eth0 = RowKey::from_index(2).unwrap();
        assert_eq!(table.cell(&eth0, 2).unwrap().value.to_text(), "eth0");
        assert_eq!(table.cell(&eth0, 3).unwrap().value, Value::Integer(6));

        let requests = mock.requests();
        assert_eq!(
            requests[0],
            MockRequest::GetBulk {
                oids: vec![if_entry().child(2), if_entry().child(3)],
                max_repetitions: 2,
            }
        );
        assert_eq!(
            requests[1],
            MockRequest::GetBulk {
                oids: vec![cell(2, 2), cell(3, 2)],
                max_repetitions: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_exhausted_columns_are_not_requested_again() {
        let mock = mock();
        mock.queue_varbinds([
            (cell(1, 1), Value::Integer(1)),
            (cell(2, 1), Value::from("lo")),
            (cell(1, 2), Value::Integer(2)),
            (cell(3, 1), Value::Integer(24)),
        ]);
        mock.queue_varbinds([(cell(2, 1), Value::from("lo"))]);

        let session = Session::new(mock.clone(), SessionOptions::default());
        let table = session.table_columns(&if_entry(), &[1, 2], 2).await.unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.cell(&RowKey::from_index(2).unwrap(), 2).is_none());

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        match &requests[1] {
            MockRequest::GetBulk { oids, .. } => assert_eq!(oids, &vec![cell(1, 2)]),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unsupported_table_is_empty() {
        let mock = mock();
        mock.queue_varbinds([
            (oid!(1, 3, 6, 1, 2, 1, 4, 1, 0), Value::Integer(1)),
            (oid!(1, 3, 6, 1, 2, 1, 4, 1, 0), Value::Integer(1)),
        ]);

        let session = Session::new(mock.clone(), SessionOptions::default());
        let table = session
            .table_columns(&oid!(1, 3, 6, 1, 2, 1, 31, 1, 1, 1), &[1, 18], 20)
            .await
            .unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_non_increasing_column_fails() {
        let mock = mock();
        mock.queue_varbinds([(cell(2, 5), Value::from("eth4"))]);
        mock.queue_varbinds([(cell(2, 3), Value::from("eth2"))]);

        let session = Session::new(mock.clone(), SessionOptions::default());
        let err = session.table_columns(&if_entry(), &[2], 1).await.unwrap_err();
        assert!(matches!(err, Error::NonIncreasingOid { .. }));
    }

    #[tokio::test]
    async fn test_v1_walks_each_column() {
        let mock = mock();
        mock.queue_varbinds([(cell(2, 1), Value::from("lo"))]);
        mock.queue_varbinds([(cell(3, 1), Value::Integer(24))]);
        mock.queue_varbinds([(cell(3, 1), Value::Integer(24))]);
        mock.queue_varbinds([(cell(4, 1), Value::Integer(65536))]);

        let options = SessionOptions {
            version: Version::V1,
            ..SessionOptions::default()
        };
        let session = Session::new(mock.clone(), options);
        let table = session.table_columns(&if_entry(), &[2, 3], 20).await.unwrap();

        let lo = RowKey::from_index(1).unwrap();
        assert_eq!(table.cell(&lo, 2).unwrap().value.to_text(), "lo");
        assert_eq!(table.cell(&lo, 3).unwrap().value, Value::Integer(24));
        assert!(mock
            .requests()
            .iter()
            .all(|r| matches!(r, MockRequest::GetNext(_))));
    }
}
