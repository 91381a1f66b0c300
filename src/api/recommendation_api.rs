// ==========================================
// App Granja - Recommendation API
// ==========================================
// Read / compute / report only. "Not enough data" and "unknown batch"
// are `status: error` results, not Err values.
// ==========================================

use crate::api::error::ApiResult;
use crate::api::lookback_start;
use crate::config::recommendation_config::{EfficiencyThresholds, RecommendationConfigReader};
use crate::domain::types::{BatchState, Scope};
use crate::engine::recommendation::{EfficiencyStats, Recommendation, RecommendationEngine};
use crate::i18n::t_with_args;
use crate::repository::{BatchRepository, FarmRepository, FeedRepository, GrowthDetailRepository};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SIMILAR_FEEDS: usize = 3;

/// Lowest energy-efficiency record of the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestRecord {
    pub fecha: NaiveDate,
    pub lote: String,
    pub alimento: String,
    pub eficiencia_energetica: Option<f64>,
    pub eficiencia_proteica: Option<f64>,
    pub relacion_energia_proteina: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedFeed {
    pub id: String,
    pub nombre: String,
    pub etapa: String,
    pub energia: Option<f64>,
    pub proteina: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchInfo {
    pub id: String,
    pub codigo: String,
    pub edad_semanas: i64,
    pub galpon: String,
    pub raza: String,
    pub alimento_actual: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShedInfo {
    pub id: String,
    pub numero: String,
    pub tipo: String,
    pub capacidad: i64,
    pub lotes_activos: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub estadisticas: EfficiencyStats,
    pub recomendaciones: Vec<Recommendation>,
    pub mejor_registro: BestRecord,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alimentos_recomendados: Vec<RecommendedFeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lote: Option<BatchInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub galpon: Option<ShedInfo>,
}

/// `{"status": "success", ...}` or `{"status": "error", "message": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NutritionalAnalysis {
    Success(Box<AnalysisReport>),
    Error { message: String },
}

impl NutritionalAnalysis {
    pub fn is_success(&self) -> bool {
        matches!(self, NutritionalAnalysis::Success(_))
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            NutritionalAnalysis::Success(r) => Some(r),
            NutritionalAnalysis::Error { .. } => None,
        }
    }

    fn error(message: String) -> Self {
        NutritionalAnalysis::Error { message }
    }
}

pub struct RecommendationApi {
    growth_repo: Arc<GrowthDetailRepository>,
    batch_repo: Arc<BatchRepository>,
    farm_repo: Arc<FarmRepository>,
    feed_repo: Arc<FeedRepository>,
    config: Arc<dyn RecommendationConfigReader + Send + Sync>,
}

impl RecommendationApi {
    pub fn new(
        growth_repo: Arc<GrowthDetailRepository>,
        batch_repo: Arc<BatchRepository>,
        farm_repo: Arc<FarmRepository>,
        feed_repo: Arc<FeedRepository>,
        config: Arc<dyn RecommendationConfigReader + Send + Sync>,
    ) -> Self {
        Self {
            growth_repo,
            batch_repo,
            farm_repo,
            feed_repo,
            config,
        }
    }

    fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    fn thresholds(&self) -> EfficiencyThresholds {
        self.config.get_efficiency_thresholds().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "no se pudieron leer los umbrales, se usan los predeterminados");
            EfficiencyThresholds::default()
        })
    }

    /// Analyse the last `dias` days (configured default when None)
    pub fn analizar_eficiencia_nutricional(&self, scope: &Scope, dias: Option<i64>) -> ApiResult<NutritionalAnalysis> {
        self.analizar_eficiencia_nutricional_at(scope, dias, Self::today())
    }

    pub fn analizar_eficiencia_nutricional_at(
        &self,
        scope: &Scope,
        dias: Option<i64>,
        hoy: NaiveDate,
    ) -> ApiResult<NutritionalAnalysis> {
        let engine = RecommendationEngine::new(self.thresholds());
        let dias = dias.unwrap_or(engine.thresholds().dias_analisis);
        let obs = self.growth_repo.list_qualifying(scope, lookback_start(hoy, dias)?)?;

        tracing::debug!(scope = ?scope, dias, registros = obs.len(), "analisis de eficiencia");
        if !engine.has_enough_data(obs.len()) {
            return Ok(NutritionalAnalysis::error(engine.insufficient_data_message()));
        }
        let (Some(estadisticas), Some(best)) = (RecommendationEngine::stats(&obs), RecommendationEngine::best_record(&obs))
        else {
            return Ok(NutritionalAnalysis::error(engine.insufficient_data_message()));
        };

        let mut recomendaciones = engine.evaluate(&estadisticas);
        let mut alimentos_recomendados = Vec::new();
        let best_feed = match best.feed_id.as_deref() {
            Some(id) => self.feed_repo.find_by_id(id)?,
            None => None,
        };
        if let Some(feed) = &best_feed {
            recomendaciones.push(RecommendationEngine::best_feed(&feed.nombre));
            alimentos_recomendados = self
                .feed_repo
                .list_same_stage(feed.etapa, &feed.feed_id, SIMILAR_FEEDS)?
                .into_iter()
                .map(|f| RecommendedFeed {
                    id: f.feed_id,
                    nombre: f.nombre,
                    etapa: f.etapa.display_name().to_string(),
                    energia: f.energia_metabolizable,
                    proteina: f.contenido_proteina,
                })
                .collect();
        }

        let mejor_registro = BestRecord {
            fecha: best.fecha_seguimiento,
            lote: best.codigo_lote.clone(),
            alimento: best
                .feed_nombre
                .clone()
                .unwrap_or_else(RecommendationEngine::unspecified_feed),
            eficiencia_energetica: best.eficiencia_energetica,
            eficiencia_proteica: best.eficiencia_proteica,
            relacion_energia_proteina: best.relacion_energia_proteina,
        };

        Ok(NutritionalAnalysis::Success(Box::new(AnalysisReport {
            estadisticas,
            recomendaciones,
            mejor_registro,
            alimentos_recomendados,
            lote: None,
            galpon: None,
        })))
    }

    // ==========================================
    // Batch / shed wrappers
    // ==========================================

    pub fn obtener_recomendaciones_lote(&self, batch_id: &str, dias: Option<i64>) -> ApiResult<NutritionalAnalysis> {
        self.obtener_recomendaciones_lote_at(batch_id, dias, Self::today())
    }

    pub fn obtener_recomendaciones_lote_at(
        &self,
        batch_id: &str,
        dias: Option<i64>,
        hoy: NaiveDate,
    ) -> ApiResult<NutritionalAnalysis> {
        let Some(batch) = self.batch_repo.find_by_id(batch_id)? else {
            return Ok(NutritionalAnalysis::error(t_with_args(
                "recomendacion.lote_no_encontrado",
                &[("id", batch_id)],
            )));
        };

        let mut analysis = self.analizar_eficiencia_nutricional_at(&Scope::Lote(batch_id.to_string()), dias, hoy)?;
        if let NutritionalAnalysis::Success(report) = &mut analysis {
            let galpon = self
                .farm_repo
                .find_shed(&batch.shed_id)?
                .map(|s| s.numero_galpon)
                .unwrap_or_default();
            let raza = self
                .farm_repo
                .find_breed(&batch.breed_id)?
                .map(|b| b.nombre)
                .unwrap_or_default();
            let alimento_actual = match batch.feed_id.as_deref() {
                Some(id) => self.feed_repo.find_by_id(id)?.map(|f| f.nombre),
                None => None,
            }
            .unwrap_or_else(RecommendationEngine::unspecified_feed);

            let edad_semanas = batch.edad_semanas(hoy);
            report.recomendaciones.push(RecommendationEngine::batch_age(edad_semanas));
            report.lote = Some(BatchInfo {
                id: batch.batch_id.clone(),
                codigo: batch.codigo_lote.clone(),
                edad_semanas,
                galpon,
                raza,
                alimento_actual,
            });
        }
        Ok(analysis)
    }

    pub fn obtener_recomendaciones_galpon(&self, shed_id: &str, dias: Option<i64>) -> ApiResult<NutritionalAnalysis> {
        self.obtener_recomendaciones_galpon_at(shed_id, dias, Self::today())
    }

    pub fn obtener_recomendaciones_galpon_at(
        &self,
        shed_id: &str,
        dias: Option<i64>,
        hoy: NaiveDate,
    ) -> ApiResult<NutritionalAnalysis> {
        let Some(shed) = self.farm_repo.find_shed(shed_id)? else {
            return Ok(NutritionalAnalysis::error(t_with_args(
                "recomendacion.galpon_no_encontrado",
                &[("id", shed_id)],
            )));
        };

        let mut analysis = self.analizar_eficiencia_nutricional_at(&Scope::Galpon(shed_id.to_string()), dias, hoy)?;
        if let NutritionalAnalysis::Success(report) = &mut analysis {
            let lotes_activos = self.batch_repo.count_in_shed(
                &shed.shed_id,
                &[BatchState::Inicial, BatchState::Crecimiento, BatchState::Produccion],
            )?;
            if let Some(r) = RecommendationEngine::shed_type(shed.tipo_galpon) {
                report.recomendaciones.push(r);
            }
            report.galpon = Some(ShedInfo {
                id: shed.shed_id.clone(),
                numero: shed.numero_galpon.clone(),
                tipo: shed.tipo_galpon.display_name().to_string(),
                capacidad: shed.capacidad_aves,
                lotes_activos,
            });
        }
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_result_shape() {
        let a = NutritionalAnalysis::error("sin datos".to_string());
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "sin datos");
        assert!(!a.is_success());
        assert!(a.report().is_none());
    }
}
