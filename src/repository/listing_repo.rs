// ==========================================
// App Granja - Generic entity listing
// ==========================================
// Reads the list columns declared in the entity catalog and returns
// each row as a JSON object. Table/column names come only from the
// static catalog, never from user input.
// ==========================================

use crate::domain::catalog::{display_of, EntityKind};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

pub struct ListingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ListingRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn list(&self, kind: EntityKind, limit: usize) -> RepositoryResult<Vec<Value>> {
        let display = display_of(kind);
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} LIMIT {}",
            display.list_columns.join(", "),
            display.table,
            display.order_by,
            limit
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                let mut obj = Map::new();
                for (i, col) in display.list_columns.iter().enumerate() {
                    let v = match row.get_ref(i)? {
                        ValueRef::Null => Value::Null,
                        ValueRef::Integer(n) => Value::from(n),
                        ValueRef::Real(f) => Value::from(f),
                        ValueRef::Text(t) => Value::from(String::from_utf8_lossy(t).into_owned()),
                        ValueRef::Blob(_) => Value::Null,
                    };
                    obj.insert((*col).to_string(), v);
                }
                Ok(Value::Object(obj))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count(&self, kind: EntityKind) -> RepositoryResult<i64> {
        let display = display_of(kind);
        let conn = self.get_conn()?;
        let n = conn.query_row(&format!("SELECT COUNT(*) FROM {}", display.table), [], |row| {
            row.get(0)
        })?;
        Ok(n)
    }
}
