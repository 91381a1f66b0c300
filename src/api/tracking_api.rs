// ==========================================
// App Granja - Tracking API (write path)
// ==========================================
// Daily tracking records and their growth details.
// - one record per (batch, date)
// - only the creator or an "edit any" role may change a record
// - growth details are re-derived on every save
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::lookback_start;
use crate::domain::access::{Actor, Operation};
use crate::domain::catalog::EntityKind;
use crate::domain::tracking::{DailyTrackingRecord, GrowthDetail, GrowthDetailInput};
use crate::engine::growth::{GrowthContext, GrowthEngine};
use crate::i18n::t_with_args;
use crate::repository::{
    BatchRepository, DailyTrackingRepository, FeedRepository, GrowthDetailRepository,
    MortalityRepository, RepositoryError,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Why a stored growth detail was left untouched by a recalculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecalcSkipReason {
    SinAlimento,
    SinEnergia,
    SinProteina,
    SinConsumo,
    SinGanancia,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecalcSummary {
    pub desde: Option<NaiveDate>,
    pub total: usize,
    pub actualizados: usize,
    pub omitidos: Vec<(String, RecalcSkipReason)>,
    pub errores: Vec<(String, String)>,
}

pub struct TrackingApi {
    tracking_repo: Arc<DailyTrackingRepository>,
    growth_repo: Arc<GrowthDetailRepository>,
    batch_repo: Arc<BatchRepository>,
    feed_repo: Arc<FeedRepository>,
    mortality_repo: Arc<MortalityRepository>,
}

impl TrackingApi {
    pub fn new(
        tracking_repo: Arc<DailyTrackingRepository>,
        growth_repo: Arc<GrowthDetailRepository>,
        batch_repo: Arc<BatchRepository>,
        feed_repo: Arc<FeedRepository>,
        mortality_repo: Arc<MortalityRepository>,
    ) -> Self {
        Self {
            tracking_repo,
            growth_repo,
            batch_repo,
            feed_repo,
            mortality_repo,
        }
    }

    // ==========================================
    // Daily tracking
    // ==========================================

    /// Store a new daily record registered by `actor`
    ///
    /// # Errors
    /// - `PermissionDenied`: role cannot create tracking records
    /// - `NotFound`: unknown batch
    /// - `BusinessRuleViolation`: the batch already has a record that day
    pub fn registrar_seguimiento(
        &self,
        actor: &Actor,
        mut record: DailyTrackingRecord,
    ) -> ApiResult<DailyTrackingRecord> {
        if !actor.can(EntityKind::SeguimientoDiario, Operation::Crear) {
            return Err(ApiError::PermissionDenied(format!(
                "{} ({}) no puede registrar seguimientos",
                actor.username, actor.role
            )));
        }
        validate_measurements(&record)?;

        let batch = self
            .batch_repo
            .find_by_id(&record.batch_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Lote(id={})", record.batch_id)))?;

        if self
            .tracking_repo
            .find_by_batch_and_date(&record.batch_id, record.fecha_seguimiento)?
            .is_some()
        {
            return Err(duplicate_error(&batch.codigo_lote, record.fecha_seguimiento));
        }

        let now = Utc::now().naive_utc();
        record.registrado_por = Some(actor.username.clone());
        record.created_at = now;
        record.updated_at = now;

        match self.tracking_repo.insert(&record) {
            Ok(()) => {}
            // lost a race against a concurrent insert
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Err(duplicate_error(&batch.codigo_lote, record.fecha_seguimiento));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            tracking_id = %record.tracking_id,
            lote = %batch.codigo_lote,
            fecha = %record.fecha_seguimiento,
            usuario = %actor.username,
            "seguimiento registrado"
        );
        Ok(record)
    }

    /// Overwrite the measurements of an existing record
    ///
    /// Batch and date are the record's identity and cannot change.
    /// An attached growth detail is re-derived from the new values and
    /// written in the same transaction; while one exists the record
    /// cannot become PRODUCCION.
    pub fn actualizar_seguimiento(
        &self,
        actor: &Actor,
        record: &DailyTrackingRecord,
    ) -> ApiResult<DailyTrackingRecord> {
        let stored = self
            .tracking_repo
            .find_by_id(&record.tracking_id)?
            .ok_or_else(|| ApiError::NotFound(format!("SeguimientoDiario(id={})", record.tracking_id)))?;

        if !actor.can_edit_tracking(&stored) {
            return Err(ApiError::PermissionDenied(t_with_args(
                "seguimiento.sin_permiso",
                &[("usuario", &actor.username)],
            )));
        }
        if stored.batch_id != record.batch_id || stored.fecha_seguimiento != record.fecha_seguimiento {
            return Err(ApiError::InvalidInput(
                "el lote y la fecha de un seguimiento no se pueden cambiar".to_string(),
            ));
        }
        validate_measurements(record)?;

        let mut updated = record.clone();
        updated.registrado_por = stored.registrado_por.clone();
        updated.created_at = stored.created_at;
        updated.updated_at = Utc::now().naive_utc();

        match self.growth_repo.find_by_tracking_id(&updated.tracking_id)? {
            Some(detail) => {
                // a growth detail pins the record to a growth type
                GrowthEngine::validate_record(&updated)?;
                let detail = self.derive_growth(&updated, &GrowthDetailInput::from(&detail))?;
                self.tracking_repo.update_with_detail(&updated, &detail)?;
            }
            None => self.tracking_repo.update(&updated)?,
        }

        tracing::info!(tracking_id = %updated.tracking_id, usuario = %actor.username, "seguimiento actualizado");
        Ok(updated)
    }

    pub fn obtener_seguimiento(&self, tracking_id: &str) -> ApiResult<DailyTrackingRecord> {
        self.tracking_repo
            .find_by_id(tracking_id)?
            .ok_or_else(|| ApiError::NotFound(format!("SeguimientoDiario(id={})", tracking_id)))
    }

    // ==========================================
    // Growth detail
    // ==========================================

    /// Create or replace the growth detail of a tracking record
    ///
    /// # Errors
    /// - `ValidationError`: the tracking record is PRODUCCION
    /// - `PermissionDenied`: role cannot create details, or cannot edit
    ///   the parent record when a detail already exists
    pub fn guardar_detalle_engorde(
        &self,
        actor: &Actor,
        tracking_id: &str,
        input: &GrowthDetailInput,
    ) -> ApiResult<GrowthDetail> {
        let record = self.obtener_seguimiento(tracking_id)?;
        GrowthEngine::validate_record(&record)?;

        let exists = self.growth_repo.find_by_tracking_id(tracking_id)?.is_some();
        let allowed = if exists {
            actor.can(EntityKind::SeguimientoEngorde, Operation::Editar) && actor.can_edit_tracking(&record)
        } else {
            actor.can(EntityKind::SeguimientoEngorde, Operation::Crear)
        };
        if !allowed {
            return Err(ApiError::PermissionDenied(t_with_args(
                "seguimiento.sin_permiso",
                &[("usuario", &actor.username)],
            )));
        }
        if input.ganancia_diaria_peso < 0.0 {
            return Err(ApiError::InvalidInput("ganancia_diaria_peso no puede ser negativa".to_string()));
        }
        for score in [input.calidad_plumaje, input.calidad_patas].into_iter().flatten() {
            if !(1..=5).contains(&score) {
                return Err(ApiError::InvalidInput(format!(
                    "las calificaciones van de 1 a 5 (recibido {})",
                    score
                )));
            }
        }

        let detail = self.save_growth(&record, input)?;
        tracing::info!(
            tracking_id = %tracking_id,
            eficiencia_energetica = ?detail.eficiencia_energetica,
            eficiencia_proteica = ?detail.eficiencia_proteica,
            "detalle de engorde guardado"
        );
        Ok(detail)
    }

    pub fn obtener_detalle_engorde(&self, tracking_id: &str) -> ApiResult<Option<GrowthDetail>> {
        Ok(self.growth_repo.find_by_tracking_id(tracking_id)?)
    }

    fn save_growth(&self, record: &DailyTrackingRecord, input: &GrowthDetailInput) -> ApiResult<GrowthDetail> {
        let detail = self.derive_growth(record, input)?;
        self.growth_repo.upsert(&detail)?;
        Ok(detail)
    }

    /// Load the derivation context of `record` and build its detail
    fn derive_growth(&self, record: &DailyTrackingRecord, input: &GrowthDetailInput) -> ApiResult<GrowthDetail> {
        let batch = self
            .batch_repo
            .find_by_id(&record.batch_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Lote(id={})", record.batch_id)))?;
        let feed = match batch.feed_id.as_deref() {
            Some(feed_id) => self.feed_repo.find_by_id(feed_id)?,
            None => None,
        };
        let previous = self
            .tracking_repo
            .find_previous(&record.batch_id, record.fecha_seguimiento)?;
        let muertes = self
            .mortality_repo
            .sum_until(&record.batch_id, record.fecha_seguimiento)?;

        let ctx = GrowthContext {
            record,
            previous: previous.as_ref(),
            batch: &batch,
            feed: feed.as_ref(),
            aves_presentes: batch.aves_presentes(muertes),
        };
        Ok(GrowthEngine::derive(input, &ctx, Utc::now().naive_utc())?)
    }

    // ==========================================
    // Batch recalculation
    // ==========================================

    /// Recompute every stored growth detail (optionally only the last `dias` days)
    pub fn recalcular_eficiencia(&self, dias: Option<i64>) -> ApiResult<RecalcSummary> {
        self.recalcular_eficiencia_at(dias, chrono::Local::now().date_naive())
    }

    pub fn recalcular_eficiencia_at(&self, dias: Option<i64>, hoy: NaiveDate) -> ApiResult<RecalcSummary> {
        let desde = dias.map(|d| lookback_start(hoy, d)).transpose()?;
        let ids = self.growth_repo.list_tracking_ids(desde)?;
        let mut summary = RecalcSummary {
            desde,
            total: ids.len(),
            ..RecalcSummary::default()
        };
        tracing::info!(total = ids.len(), desde = ?desde, "recalculando eficiencia nutricional");

        for tracking_id in ids {
            match self.recalc_one(&tracking_id) {
                Ok(None) => summary.actualizados += 1,
                Ok(Some(reason)) => {
                    tracing::warn!(tracking_id = %tracking_id, motivo = ?reason, "registro omitido");
                    summary.omitidos.push((tracking_id, reason));
                }
                Err(e) => {
                    tracing::error!(tracking_id = %tracking_id, error = %e, "error al recalcular");
                    summary.errores.push((tracking_id, e.to_string()));
                }
            }
        }

        tracing::info!(
            actualizados = summary.actualizados,
            omitidos = summary.omitidos.len(),
            errores = summary.errores.len(),
            "recalculo completado"
        );
        Ok(summary)
    }

    /// Ok(None) when updated, Ok(Some(reason)) when skipped
    fn recalc_one(&self, tracking_id: &str) -> ApiResult<Option<RecalcSkipReason>> {
        let record = self.obtener_seguimiento(tracking_id)?;
        let detail = self
            .growth_repo
            .find_by_tracking_id(tracking_id)?
            .ok_or_else(|| ApiError::NotFound(format!("SeguimientoEngorde(id={})", tracking_id)))?;
        let batch = self
            .batch_repo
            .find_by_id(&record.batch_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Lote(id={})", record.batch_id)))?;

        let feed = match batch.feed_id.as_deref() {
            Some(id) => self.feed_repo.find_by_id(id)?,
            None => None,
        };
        let reason = match &feed {
            None => Some(RecalcSkipReason::SinAlimento),
            Some(f) if f.energia_metabolizable.map_or(true, |v| v <= 0.0) => Some(RecalcSkipReason::SinEnergia),
            Some(f) if f.contenido_proteina.map_or(true, |v| v <= 0.0) => Some(RecalcSkipReason::SinProteina),
            Some(_) if record.consumo_alimento_kg <= 0.0 => Some(RecalcSkipReason::SinConsumo),
            Some(_) if detail.ganancia_diaria_peso <= 0.0 => Some(RecalcSkipReason::SinGanancia),
            Some(_) => None,
        };
        if reason.is_some() {
            return Ok(reason);
        }

        self.save_growth(&record, &GrowthDetailInput::from(&detail))?;
        Ok(None)
    }
}

fn duplicate_error(codigo_lote: &str, fecha: NaiveDate) -> ApiError {
    ApiError::BusinessRuleViolation(t_with_args(
        "seguimiento.duplicado",
        &[("lote", codigo_lote), ("fecha", &fecha.to_string())],
    ))
}

fn validate_measurements(r: &DailyTrackingRecord) -> ApiResult<()> {
    if r.peso_promedio_ave < 0.0 || r.consumo_alimento_kg < 0.0 {
        return Err(ApiError::InvalidInput(
            "peso y consumo de alimento no pueden ser negativos".to_string(),
        ));
    }
    if r.mortalidad < 0 || r.huevos_totales < 0 || r.huevos_rotos < 0 || r.huevos_sucios < 0 {
        return Err(ApiError::InvalidInput("los conteos no pueden ser negativos".to_string()));
    }
    if r.huevos_rotos + r.huevos_sucios > r.huevos_totales {
        return Err(ApiError::InvalidInput(format!(
            "huevos rotos + sucios ({}) superan el total ({})",
            r.huevos_rotos + r.huevos_sucios,
            r.huevos_totales
        )));
    }
    if let (Some(min), Some(max)) = (r.temperatura_min, r.temperatura_max) {
        if min > max {
            return Err(ApiError::InvalidInput(format!(
                "temperatura mínima {} mayor que la máxima {}",
                min, max
            )));
        }
    }
    Ok(())
}
