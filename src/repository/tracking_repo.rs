// ==========================================
// App Granja - Daily tracking / growth detail repositories
// ==========================================
// daily_tracking: UNIQUE(batch_id, fecha_seguimiento)
// growth_detail:  tracking_id is both PK and FK (1:1)
// ==========================================

use crate::domain::tracking::{DailyTrackingRecord, GrowthDetail, GrowthObservation};
use crate::domain::types::{Scope, TrackingType, Uniformity};
use crate::repository::error::{
    parse_date, parse_datetime, parse_enum, RepositoryError, RepositoryResult, DATETIME_FMT, DATE_FMT,
};
use crate::repository::sql_builder::SqlQueryBuilder;
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const TRACKING_COLUMNS: &str = "t.tracking_id, t.batch_id, t.fecha_seguimiento, t.registrado_por, \
     t.tipo_seguimiento, t.huevos_totales, t.huevos_rotos, t.huevos_sucios, t.peso_promedio_ave, \
     t.consumo_alimento_kg, t.consumo_agua_litros, t.temperatura_min, t.temperatura_max, t.humedad, \
     t.mortalidad, t.causa_mortalidad, t.observaciones, t.created_at, t.updated_at";

// ==========================================
// DailyTrackingRepository
// ==========================================

pub struct DailyTrackingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DailyTrackingRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert a record; a second record for the same (batch, date)
    /// fails with `UniqueConstraintViolation`
    pub fn insert(&self, r: &DailyTrackingRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO daily_tracking (
                tracking_id, batch_id, fecha_seguimiento, registrado_por, tipo_seguimiento,
                huevos_totales, huevos_rotos, huevos_sucios, peso_promedio_ave, consumo_alimento_kg,
                consumo_agua_litros, temperatura_min, temperatura_max, humedad, mortalidad,
                causa_mortalidad, observaciones, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            params![
                r.tracking_id,
                r.batch_id,
                r.fecha_seguimiento.format(DATE_FMT).to_string(),
                r.registrado_por,
                r.tipo_seguimiento.as_str(),
                r.huevos_totales,
                r.huevos_rotos,
                r.huevos_sucios,
                r.peso_promedio_ave,
                r.consumo_alimento_kg,
                r.consumo_agua_litros,
                r.temperatura_min,
                r.temperatura_max,
                r.humedad,
                r.mortalidad,
                r.causa_mortalidad,
                r.observaciones,
                r.created_at.format(DATETIME_FMT).to_string(),
                r.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// Overwrite the measurements of an existing record (keys and creator unchanged)
    pub fn update(&self, r: &DailyTrackingRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        update_tracking(&conn, r)
    }

    /// Update a record and replace its growth detail in one transaction
    pub fn update_with_detail(&self, r: &DailyTrackingRecord, detail: &GrowthDetail) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        update_tracking(&tx, r)?;
        upsert_growth(&tx, detail)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    pub fn find_by_id(&self, tracking_id: &str) -> RepositoryResult<Option<DailyTrackingRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM daily_tracking t WHERE t.tracking_id = ?1",
            TRACKING_COLUMNS
        );
        let rec = conn.query_row(&sql, params![tracking_id], map_tracking).optional()?;
        Ok(rec)
    }

    pub fn find_by_batch_and_date(
        &self,
        batch_id: &str,
        fecha: NaiveDate,
    ) -> RepositoryResult<Option<DailyTrackingRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM daily_tracking t WHERE t.batch_id = ?1 AND t.fecha_seguimiento = ?2",
            TRACKING_COLUMNS
        );
        let rec = conn
            .query_row(
                &sql,
                params![batch_id, fecha.format(DATE_FMT).to_string()],
                map_tracking,
            )
            .optional()?;
        Ok(rec)
    }

    /// Latest record of the batch strictly before `fecha`
    pub fn find_previous(
        &self,
        batch_id: &str,
        fecha: NaiveDate,
    ) -> RepositoryResult<Option<DailyTrackingRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM daily_tracking t
            WHERE t.batch_id = ?1 AND t.fecha_seguimiento < ?2
            ORDER BY t.fecha_seguimiento DESC
            LIMIT 1
            "#,
            TRACKING_COLUMNS
        );
        let rec = conn
            .query_row(
                &sql,
                params![batch_id, fecha.format(DATE_FMT).to_string()],
                map_tracking,
            )
            .optional()?;
        Ok(rec)
    }

    /// Records in [start, end] within a batch/shed scope, by date
    pub fn list_in_range(
        &self,
        scope: &Scope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<DailyTrackingRecord>> {
        let (sql, values) = SqlQueryBuilder::new(&format!(
            "SELECT {} FROM daily_tracking t JOIN batch b ON b.batch_id = t.batch_id",
            TRACKING_COLUMNS
        ))
        .date_between("t.fecha_seguimiento", start, end)
        .scope(scope, "t.batch_id", "b.shed_id")
        .order_by("t.fecha_seguimiento, t.batch_id")
        .build();

        tracing::debug!(%sql, "list_in_range");
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), map_tracking)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn update_tracking(conn: &Connection, r: &DailyTrackingRecord) -> RepositoryResult<()> {
    let n = conn.execute(
        r#"
        UPDATE daily_tracking SET
            tipo_seguimiento = ?2, huevos_totales = ?3, huevos_rotos = ?4, huevos_sucios = ?5,
            peso_promedio_ave = ?6, consumo_alimento_kg = ?7, consumo_agua_litros = ?8,
            temperatura_min = ?9, temperatura_max = ?10, humedad = ?11, mortalidad = ?12,
            causa_mortalidad = ?13, observaciones = ?14, updated_at = ?15
        WHERE tracking_id = ?1
        "#,
        params![
            r.tracking_id,
            r.tipo_seguimiento.as_str(),
            r.huevos_totales,
            r.huevos_rotos,
            r.huevos_sucios,
            r.peso_promedio_ave,
            r.consumo_alimento_kg,
            r.consumo_agua_litros,
            r.temperatura_min,
            r.temperatura_max,
            r.humedad,
            r.mortalidad,
            r.causa_mortalidad,
            r.observaciones,
            r.updated_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    if n == 0 {
        return Err(RepositoryError::NotFound {
            entity: "SeguimientoDiario".to_string(),
            id: r.tracking_id.clone(),
        });
    }
    Ok(())
}

fn map_tracking(row: &Row<'_>) -> rusqlite::Result<DailyTrackingRecord> {
    Ok(DailyTrackingRecord {
        tracking_id: row.get(0)?,
        batch_id: row.get(1)?,
        fecha_seguimiento: parse_date(2, &row.get::<_, String>(2)?)?,
        registrado_por: row.get(3)?,
        tipo_seguimiento: parse_enum::<TrackingType>(4, &row.get::<_, String>(4)?)?,
        huevos_totales: row.get(5)?,
        huevos_rotos: row.get(6)?,
        huevos_sucios: row.get(7)?,
        peso_promedio_ave: row.get(8)?,
        consumo_alimento_kg: row.get(9)?,
        consumo_agua_litros: row.get(10)?,
        temperatura_min: row.get(11)?,
        temperatura_max: row.get(12)?,
        humedad: row.get(13)?,
        mortalidad: row.get(14)?,
        causa_mortalidad: row.get(15)?,
        observaciones: row.get(16)?,
        created_at: parse_datetime(17, &row.get::<_, String>(17)?)?,
        updated_at: parse_datetime(18, &row.get::<_, String>(18)?)?,
    })
}

// ==========================================
// GrowthDetailRepository
// ==========================================

const GROWTH_COLUMNS: &str = "tracking_id, ganancia_diaria_peso, conversion_alimenticia, uniformidad, \
     indice_productividad, consumo_energia, consumo_proteina, eficiencia_energetica, eficiencia_proteica, \
     relacion_energia_proteina, longitud_corporal, ancho_pechuga, calidad_plumaje, calidad_patas, \
     observaciones_engorde, calculated_at, conversion_manual, indice_manual";

const OBSERVATION_SELECT: &str = r#"
    SELECT g.tracking_id, t.batch_id, b.codigo_lote, b.shed_id, t.fecha_seguimiento,
           t.peso_promedio_ave, g.ganancia_diaria_peso, g.conversion_alimenticia,
           g.eficiencia_energetica, g.eficiencia_proteica, g.relacion_energia_proteina,
           b.feed_id, f.nombre
    FROM growth_detail g
    JOIN daily_tracking t ON t.tracking_id = g.tracking_id
    JOIN batch b ON b.batch_id = t.batch_id
    LEFT JOIN feed f ON f.feed_id = b.feed_id"#;

/// Details hanging off a PRODUCCION record never count as growth data
const GROWTH_TYPES_FILTER: &str = "t.tipo_seguimiento IN ('ENGORDE', 'MIXTO')";

pub struct GrowthDetailRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GrowthDetailRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert or replace the detail of a tracking record
    pub fn upsert(&self, d: &GrowthDetail) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        upsert_growth(&conn, d)
    }

    pub fn find_by_tracking_id(&self, tracking_id: &str) -> RepositoryResult<Option<GrowthDetail>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM growth_detail WHERE tracking_id = ?1", GROWTH_COLUMNS);
        let detail = conn.query_row(&sql, params![tracking_id], map_growth).optional()?;
        Ok(detail)
    }

    /// Growth observations in [start, end] within a scope, by date
    pub fn list_observations(
        &self,
        scope: &Scope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<GrowthObservation>> {
        let (sql, values) = SqlQueryBuilder::new(OBSERVATION_SELECT)
            .where_clause(GROWTH_TYPES_FILTER)
            .date_between("t.fecha_seguimiento", start, end)
            .scope(scope, "t.batch_id", "b.shed_id")
            .order_by("t.fecha_seguimiento, b.codigo_lote")
            .build();
        self.query_observations(&sql, &values)
    }

    /// Observations since `desde` with both efficiencies present
    pub fn list_qualifying(&self, scope: &Scope, desde: NaiveDate) -> RepositoryResult<Vec<GrowthObservation>> {
        let (sql, values) = SqlQueryBuilder::new(OBSERVATION_SELECT)
            .where_clause(GROWTH_TYPES_FILTER)
            .where_param("t.fecha_seguimiento >= ?", desde.format(DATE_FMT).to_string())
            .where_clause("g.eficiencia_energetica IS NOT NULL")
            .where_clause("g.eficiencia_proteica IS NOT NULL")
            .scope(scope, "t.batch_id", "b.shed_id")
            .order_by("t.fecha_seguimiento, b.codigo_lote")
            .build();
        self.query_observations(&sql, &values)
    }

    /// Tracking ids of every stored detail, optionally since a date
    pub fn list_tracking_ids(&self, desde: Option<NaiveDate>) -> RepositoryResult<Vec<String>> {
        let mut builder = SqlQueryBuilder::new(
            "SELECT g.tracking_id FROM growth_detail g JOIN daily_tracking t ON t.tracking_id = g.tracking_id",
        );
        if let Some(d) = desde {
            builder = builder.where_param("t.fecha_seguimiento >= ?", d.format(DATE_FMT).to_string());
        }
        let (sql, values) = builder.order_by("t.fecha_seguimiento, t.batch_id").build();

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(values.iter()), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn query_observations(&self, sql: &str, values: &[String]) -> RepositoryResult<Vec<GrowthObservation>> {
        tracing::debug!(%sql, "growth observations");
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), map_observation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn upsert_growth(conn: &Connection, d: &GrowthDetail) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO growth_detail (
            tracking_id, ganancia_diaria_peso, conversion_alimenticia, uniformidad,
            indice_productividad, consumo_energia, consumo_proteina, eficiencia_energetica,
            eficiencia_proteica, relacion_energia_proteina, longitud_corporal, ancho_pechuga,
            calidad_plumaje, calidad_patas, observaciones_engorde, calculated_at,
            conversion_manual, indice_manual
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
        ON CONFLICT(tracking_id) DO UPDATE SET
            ganancia_diaria_peso = excluded.ganancia_diaria_peso,
            conversion_alimenticia = excluded.conversion_alimenticia,
            uniformidad = excluded.uniformidad,
            indice_productividad = excluded.indice_productividad,
            consumo_energia = excluded.consumo_energia,
            consumo_proteina = excluded.consumo_proteina,
            eficiencia_energetica = excluded.eficiencia_energetica,
            eficiencia_proteica = excluded.eficiencia_proteica,
            relacion_energia_proteina = excluded.relacion_energia_proteina,
            longitud_corporal = excluded.longitud_corporal,
            ancho_pechuga = excluded.ancho_pechuga,
            calidad_plumaje = excluded.calidad_plumaje,
            calidad_patas = excluded.calidad_patas,
            observaciones_engorde = excluded.observaciones_engorde,
            calculated_at = excluded.calculated_at,
            conversion_manual = excluded.conversion_manual,
            indice_manual = excluded.indice_manual
        "#,
        params![
            d.tracking_id,
            d.ganancia_diaria_peso,
            d.conversion_alimenticia,
            d.uniformidad.as_str(),
            d.indice_productividad,
            d.consumo_energia,
            d.consumo_proteina,
            d.eficiencia_energetica,
            d.eficiencia_proteica,
            d.relacion_energia_proteina,
            d.longitud_corporal,
            d.ancho_pechuga,
            d.calidad_plumaje,
            d.calidad_patas,
            d.observaciones_engorde,
            d.calculated_at.format(DATETIME_FMT).to_string(),
            d.conversion_manual,
            d.indice_manual,
        ],
    )?;
    Ok(())
}

fn map_growth(row: &Row<'_>) -> rusqlite::Result<GrowthDetail> {
    Ok(GrowthDetail {
        tracking_id: row.get(0)?,
        ganancia_diaria_peso: row.get(1)?,
        conversion_alimenticia: row.get(2)?,
        uniformidad: parse_enum::<Uniformity>(3, &row.get::<_, String>(3)?)?,
        indice_productividad: row.get(4)?,
        consumo_energia: row.get(5)?,
        consumo_proteina: row.get(6)?,
        eficiencia_energetica: row.get(7)?,
        eficiencia_proteica: row.get(8)?,
        relacion_energia_proteina: row.get(9)?,
        longitud_corporal: row.get(10)?,
        ancho_pechuga: row.get(11)?,
        calidad_plumaje: row.get(12)?,
        calidad_patas: row.get(13)?,
        observaciones_engorde: row.get(14)?,
        calculated_at: parse_datetime(15, &row.get::<_, String>(15)?)?,
        conversion_manual: row.get(16)?,
        indice_manual: row.get(17)?,
    })
}

fn map_observation(row: &Row<'_>) -> rusqlite::Result<GrowthObservation> {
    Ok(GrowthObservation {
        tracking_id: row.get(0)?,
        batch_id: row.get(1)?,
        codigo_lote: row.get(2)?,
        shed_id: row.get(3)?,
        fecha_seguimiento: parse_date(4, &row.get::<_, String>(4)?)?,
        peso_promedio_ave: row.get(5)?,
        ganancia_diaria_peso: row.get(6)?,
        conversion_alimenticia: row.get(7)?,
        eficiencia_energetica: row.get(8)?,
        eficiencia_proteica: row.get(9)?,
        relacion_energia_proteina: row.get(10)?,
        feed_id: row.get(11)?,
        feed_nombre: row.get(12)?,
    })
}
