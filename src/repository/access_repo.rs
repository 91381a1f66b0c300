// ==========================================
// App Granja - Persisted role grants
// ==========================================
// role_capability holds the grants currently in force; the plan
// computed from CapabilityTable is applied in one transaction.
// ==========================================

use crate::domain::access::{CapabilityPlan, Grant, Operation, Role};
use crate::domain::catalog::EntityKind;
use crate::repository::error::{parse_enum, RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

pub struct AccessRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AccessRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn load_grants(&self) -> RepositoryResult<BTreeSet<Grant>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT role, entity, operation FROM role_capability")?;
        let grants = stmt
            .query_map([], |row| {
                Ok(Grant {
                    role: parse_enum::<Role>(0, &row.get::<_, String>(0)?)?,
                    entity: parse_enum::<EntityKind>(1, &row.get::<_, String>(1)?)?,
                    operation: parse_enum::<Operation>(2, &row.get::<_, String>(2)?)?,
                })
            })?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(grants)
    }

    /// Apply grants and revocations atomically
    pub fn apply_plan(&self, plan: &CapabilityPlan) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for g in &plan.grant {
            tx.execute(
                "INSERT OR IGNORE INTO role_capability (role, entity, operation) VALUES (?1, ?2, ?3)",
                params![g.role.as_str(), g.entity.as_str(), g.operation.as_str()],
            )?;
        }
        for g in &plan.revoke {
            tx.execute(
                "DELETE FROM role_capability WHERE role = ?1 AND entity = ?2 AND operation = ?3",
                params![g.role.as_str(), g.entity.as_str(), g.operation.as_str()],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        tracing::info!(
            granted = plan.grant.len(),
            revoked = plan.revoke.len(),
            "permisos sincronizados"
        );
        Ok(())
    }
}
