// ==========================================
// App Granja - Vaccine repository
// ==========================================

use crate::domain::vaccine::Vaccine;
use crate::repository::error::{RepositoryError, RepositoryResult, DATE_FMT};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct VaccineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl VaccineRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, v: &Vaccine) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO vaccine (
                vaccine_id, nombre_comercial, principio_activo, lote_fabricante,
                fecha_vencimiento, stock_ml, precio_ml, activo
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                v.vaccine_id,
                v.nombre_comercial,
                v.principio_activo,
                v.lote_fabricante,
                v.fecha_vencimiento.map(|d| d.format(DATE_FMT).to_string()),
                v.stock_ml,
                v.precio_ml,
                v.activo,
            ],
        )?;
        Ok(())
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM vaccine", [], |row| row.get(0))?;
        Ok(n)
    }
}
