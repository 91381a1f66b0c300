// ==========================================
// App Granja - Mortality repository
// ==========================================
// daily_mortality:  UNIQUE(batch_id, fecha)
// weekly_mortality: PK(batch_id, anio, semana), rewritten by the
//                   daily write path, never by triggers
// ==========================================

use crate::domain::mortality::{DailyMortality, WeeklyMortality};
use crate::repository::error::{parse_date, RepositoryError, RepositoryResult, DATE_FMT};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub struct MortalityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MortalityRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Daily
    // ==========================================

    /// Insert a daily row and rewrite its ISO week in one transaction
    pub fn insert_daily(&self, m: &DailyMortality, cantidad_inicial_aves: i64) -> RepositoryResult<WeeklyMortality> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        tx.execute(
            r#"
            INSERT INTO daily_mortality (mortality_id, batch_id, fecha, cantidad_muertes, causa, observaciones)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                m.mortality_id,
                m.batch_id,
                m.fecha.format(DATE_FMT).to_string(),
                m.cantidad_muertes,
                m.causa,
                m.observaciones,
            ],
        )?;
        let weekly = refresh_week(&tx, m, cantidad_inicial_aves)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(weekly)
    }

    pub fn find_daily(&self, mortality_id: &str) -> RepositoryResult<Option<DailyMortality>> {
        let conn = self.get_conn()?;
        let m = conn
            .query_row(
                r#"
                SELECT mortality_id, batch_id, fecha, cantidad_muertes, causa, observaciones
                FROM daily_mortality WHERE mortality_id = ?1
                "#,
                params![mortality_id],
                map_daily,
            )
            .optional()?;
        Ok(m)
    }

    /// Delete a daily row and rewrite its ISO week in one transaction
    pub fn delete_daily(&self, m: &DailyMortality, cantidad_inicial_aves: i64) -> RepositoryResult<WeeklyMortality> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let n = tx.execute(
            "DELETE FROM daily_mortality WHERE mortality_id = ?1",
            params![m.mortality_id],
        )?;
        if n == 0 {
            return Err(RepositoryError::NotFound {
                entity: "MortalidadDiaria".to_string(),
                id: m.mortality_id.clone(),
            });
        }
        let weekly = refresh_week(&tx, m, cantidad_inicial_aves)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(weekly)
    }

    /// Deaths of the batch up to and including `hasta`
    pub fn sum_until(&self, batch_id: &str, hasta: NaiveDate) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let total = conn.query_row(
            "SELECT COALESCE(SUM(cantidad_muertes), 0) FROM daily_mortality WHERE batch_id = ?1 AND fecha <= ?2",
            params![batch_id, hasta.format(DATE_FMT).to_string()],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    // ==========================================
    // Weekly
    // ==========================================

    pub fn list_weekly(&self, batch_id: &str) -> RepositoryResult<Vec<WeeklyMortality>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, semana, anio, total_muertes, porcentaje_mortalidad
            FROM weekly_mortality WHERE batch_id = ?1
            ORDER BY anio, semana
            "#,
        )?;
        let rows = stmt
            .query_map(params![batch_id], map_weekly)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Recount the ISO week of `m` and upsert its aggregate
fn refresh_week(conn: &Connection, m: &DailyMortality, cantidad_inicial_aves: i64) -> RepositoryResult<WeeklyMortality> {
    let (anio, semana) = m.iso_week();
    let (lunes, domingo) = WeeklyMortality::compute(&m.batch_id, anio, semana, 0, cantidad_inicial_aves)
        .date_range()
        .ok_or_else(|| RepositoryError::InternalError(format!("semana ISO inválida: {}-{}", anio, semana)))?;

    let total: i64 = conn.query_row(
        r#"
        SELECT COALESCE(SUM(cantidad_muertes), 0) FROM daily_mortality
        WHERE batch_id = ?1 AND fecha >= ?2 AND fecha <= ?3
        "#,
        params![
            m.batch_id,
            lunes.format(DATE_FMT).to_string(),
            domingo.format(DATE_FMT).to_string()
        ],
        |row| row.get(0),
    )?;

    let weekly = WeeklyMortality::compute(&m.batch_id, anio, semana, total, cantidad_inicial_aves);
    conn.execute(
        r#"
        INSERT INTO weekly_mortality (batch_id, anio, semana, total_muertes, porcentaje_mortalidad)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(batch_id, anio, semana) DO UPDATE SET
            total_muertes = excluded.total_muertes,
            porcentaje_mortalidad = excluded.porcentaje_mortalidad
        "#,
        params![
            weekly.batch_id,
            weekly.anio,
            weekly.semana,
            weekly.total_muertes,
            weekly.porcentaje_mortalidad
        ],
    )?;
    tracing::debug!(batch_id = %m.batch_id, anio, semana, total, "mortalidad semanal recalculada");
    Ok(weekly)
}

fn map_daily(row: &Row<'_>) -> rusqlite::Result<DailyMortality> {
    Ok(DailyMortality {
        mortality_id: row.get(0)?,
        batch_id: row.get(1)?,
        fecha: parse_date(2, &row.get::<_, String>(2)?)?,
        cantidad_muertes: row.get(3)?,
        causa: row.get(4)?,
        observaciones: row.get(5)?,
    })
}

fn map_weekly(row: &Row<'_>) -> rusqlite::Result<WeeklyMortality> {
    Ok(WeeklyMortality {
        batch_id: row.get(0)?,
        semana: row.get(1)?,
        anio: row.get(2)?,
        total_muertes: row.get(3)?,
        porcentaje_mortalidad: row.get(4)?,
    })
}
