// ==========================================
// App Granja - Growth detail derivation
// ==========================================
// Builds the stored GrowthDetail from the caller input plus the
// tracking context: feed conversion, productivity index and the
// nutritional efficiency block. Pure; the API layer loads the context.
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::feed::Feed;
use crate::domain::tracking::{DailyTrackingRecord, GrowthDetail, GrowthDetailInput};
use crate::domain::types::TrackingType;
use crate::engine::efficiency::EfficiencyCalculator;
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrowthRuleError {
    #[error("GrowthDetail requires a growth-type tracking record")]
    NotGrowthRecord { tipo: TrackingType },
}

/// Everything the derivation reads besides the input
pub struct GrowthContext<'a> {
    pub record: &'a DailyTrackingRecord,
    /// Latest record of the same batch strictly before `record`
    pub previous: Option<&'a DailyTrackingRecord>,
    pub batch: &'a Batch,
    pub feed: Option<&'a Feed>,
    /// Birds alive on the record date
    pub aves_presentes: i64,
}

pub struct GrowthEngine;

impl GrowthEngine {
    pub fn validate_record(record: &DailyTrackingRecord) -> Result<(), GrowthRuleError> {
        if record.tipo_seguimiento.admits_growth_detail() {
            Ok(())
        } else {
            Err(GrowthRuleError::NotGrowthRecord {
                tipo: record.tipo_seguimiento,
            })
        }
    }

    /// kg of feed per kg of live weight gained since the previous record
    pub fn conversion_alimenticia(
        record: &DailyTrackingRecord,
        previous: Option<&DailyTrackingRecord>,
        aves_presentes: i64,
    ) -> Option<f64> {
        if !record.tipo_seguimiento.admits_growth_detail() {
            return None;
        }
        let previous = previous?;
        let ganancia_por_ave = record.peso_promedio_ave - previous.peso_promedio_ave;
        if ganancia_por_ave <= 0.0 || aves_presentes <= 0 {
            return None;
        }
        let ganancia_total = ganancia_por_ave * aves_presentes as f64;
        if ganancia_total <= 0.0 {
            return None;
        }
        Some(record.consumo_alimento_kg / ganancia_total)
    }

    /// (weight kg * survival %) / (age days * FCR) * 100
    pub fn indice_productividad(
        peso_promedio_ave: f64,
        supervivencia_pct: f64,
        edad_dias: i64,
        conversion_alimenticia: Option<f64>,
    ) -> Option<f64> {
        match conversion_alimenticia {
            Some(fcr) if edad_dias > 0 && fcr > 0.0 => {
                Some(peso_promedio_ave * supervivencia_pct / (edad_dias as f64 * fcr) * 100.0)
            }
            _ => None,
        }
    }

    /// Derive every computed field; caller-supplied FCR / index win
    pub fn derive(
        input: &GrowthDetailInput,
        ctx: &GrowthContext<'_>,
        calculated_at: NaiveDateTime,
    ) -> Result<GrowthDetail, GrowthRuleError> {
        Self::validate_record(ctx.record)?;

        let conversion_alimenticia = input.conversion_alimenticia.or_else(|| {
            Self::conversion_alimenticia(ctx.record, ctx.previous, ctx.aves_presentes)
        });

        let indice_productividad = input.indice_productividad.or_else(|| {
            Self::indice_productividad(
                ctx.record.peso_promedio_ave,
                ctx.batch.supervivencia_pct(ctx.aves_presentes),
                ctx.batch.edad_dias(ctx.record.fecha_seguimiento),
                conversion_alimenticia,
            )
        });

        let eff = EfficiencyCalculator::calculate(
            ctx.record.consumo_alimento_kg,
            input.ganancia_diaria_peso,
            ctx.feed,
        );

        Ok(GrowthDetail {
            tracking_id: ctx.record.tracking_id.clone(),
            ganancia_diaria_peso: input.ganancia_diaria_peso,
            conversion_alimenticia,
            uniformidad: input.uniformidad,
            indice_productividad,
            conversion_manual: input.conversion_alimenticia.is_some(),
            indice_manual: input.indice_productividad.is_some(),
            consumo_energia: eff.consumo_energia,
            consumo_proteina: eff.consumo_proteina,
            eficiencia_energetica: eff.eficiencia_energetica,
            eficiencia_proteica: eff.eficiencia_proteica,
            relacion_energia_proteina: eff.relacion_energia_proteina,
            longitud_corporal: input.longitud_corporal,
            ancho_pechuga: input.ancho_pechuga,
            calidad_plumaje: input.calidad_plumaje,
            calidad_patas: input.calidad_patas,
            observaciones_engorde: input.observaciones_engorde.clone(),
            calculated_at,
        })
    }
}
