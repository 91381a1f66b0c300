// ==========================================
// App Granja - Batch (Lote) repository
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::types::BatchState;
use crate::repository::error::{parse_date, parse_enum, RepositoryError, RepositoryResult, DATE_FMT};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const BATCH_COLUMNS: &str = "batch_id, shed_id, breed_id, feed_id, codigo_lote, fecha_inicio, \
                             cantidad_inicial_aves, edad_inicial_semanas, estado";

pub struct BatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BatchRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, batch: &Batch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO batch (batch_id, shed_id, breed_id, feed_id, codigo_lote, fecha_inicio,
                               cantidad_inicial_aves, edad_inicial_semanas, estado)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                batch.batch_id,
                batch.shed_id,
                batch.breed_id,
                batch.feed_id,
                batch.codigo_lote,
                batch.fecha_inicio.format(DATE_FMT).to_string(),
                batch.cantidad_inicial_aves,
                batch.edad_inicial_semanas,
                batch.estado.as_str(),
            ],
        )?;
        tracing::info!(batch_id = %batch.batch_id, codigo = %batch.codigo_lote, "lote creado");
        Ok(())
    }

    pub fn find_by_id(&self, batch_id: &str) -> RepositoryResult<Option<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM batch WHERE batch_id = ?1", BATCH_COLUMNS);
        let batch = conn.query_row(&sql, params![batch_id], map_batch).optional()?;
        Ok(batch)
    }

    pub fn find_by_code(&self, codigo_lote: &str) -> RepositoryResult<Option<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM batch WHERE codigo_lote = ?1", BATCH_COLUMNS);
        let batch = conn.query_row(&sql, params![codigo_lote], map_batch).optional()?;
        Ok(batch)
    }

    /// Batches of a shed, newest first
    pub fn list_by_shed(&self, shed_id: &str) -> RepositoryResult<Vec<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM batch WHERE shed_id = ?1 ORDER BY fecha_inicio DESC, codigo_lote",
            BATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let batches = stmt
            .query_map(params![shed_id], map_batch)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM batch ORDER BY codigo_lote", BATCH_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let batches = stmt
            .query_map([], map_batch)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    pub fn update_state(&self, batch_id: &str, estado: BatchState) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            "UPDATE batch SET estado = ?1 WHERE batch_id = ?2",
            params![estado.as_str(), batch_id],
        )?;
        if n == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Lote".to_string(),
                id: batch_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn update_feed(&self, batch_id: &str, feed_id: Option<&str>) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            "UPDATE batch SET feed_id = ?1 WHERE batch_id = ?2",
            params![feed_id, batch_id],
        )?;
        if n == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Lote".to_string(),
                id: batch_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM batch", [], |row| row.get(0))?;
        Ok(n)
    }

    /// Batches in any of the given states
    pub fn count_in_states(&self, estados: &[BatchState]) -> RepositoryResult<i64> {
        if estados.is_empty() {
            return Ok(0);
        }
        let conn = self.get_conn()?;
        let placeholders = vec!["?"; estados.len()].join(", ");
        let sql = format!("SELECT COUNT(*) FROM batch WHERE estado IN ({})", placeholders);
        let n = conn.query_row(
            &sql,
            rusqlite::params_from_iter(estados.iter().map(|e| e.as_str())),
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// Batches of a shed in any of the given states
    pub fn count_in_shed(&self, shed_id: &str, estados: &[BatchState]) -> RepositoryResult<i64> {
        let batches = self.list_by_shed(shed_id)?;
        Ok(batches.iter().filter(|b| estados.contains(&b.estado)).count() as i64)
    }
}

fn map_batch(row: &Row<'_>) -> rusqlite::Result<Batch> {
    Ok(Batch {
        batch_id: row.get(0)?,
        shed_id: row.get(1)?,
        breed_id: row.get(2)?,
        feed_id: row.get(3)?,
        codigo_lote: row.get(4)?,
        fecha_inicio: parse_date(5, &row.get::<_, String>(5)?)?,
        cantidad_inicial_aves: row.get(6)?,
        edad_inicial_semanas: row.get(7)?,
        estado: parse_enum::<BatchState>(8, &row.get::<_, String>(8)?)?,
    })
}
