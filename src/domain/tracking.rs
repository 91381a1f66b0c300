// ==========================================
// App Granja - Daily tracking / growth detail domain model
// ==========================================
// DailyTrackingRecord: one row per (batch, date)
// GrowthDetail: 1:1 extension of an ENGORDE / MIXTO record,
//               derived metrics computed at save time
// ==========================================

use crate::domain::types::{TrackingType, Uniformity};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// DailyTrackingRecord (Seguimiento Diario)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrackingRecord {
    // ===== Keys =====
    pub tracking_id: String,
    pub batch_id: String,
    pub fecha_seguimiento: NaiveDate,
    pub registrado_por: Option<String>,
    pub tipo_seguimiento: TrackingType,

    // ===== Egg production (PRODUCCION / MIXTO) =====
    pub huevos_totales: i64,
    pub huevos_rotos: i64,
    pub huevos_sucios: i64,

    // ===== Weight and feeding =====
    pub peso_promedio_ave: f64,   // kg
    pub consumo_alimento_kg: f64, // kg
    pub consumo_agua_litros: Option<f64>,

    // ===== Environment =====
    pub temperatura_min: Option<f64>,
    pub temperatura_max: Option<f64>,
    pub humedad: Option<f64>,

    // ===== Mortality =====
    pub mortalidad: i64,
    pub causa_mortalidad: String,

    pub observaciones: String,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl DailyTrackingRecord {
    pub fn new(batch_id: &str, fecha_seguimiento: NaiveDate, tipo_seguimiento: TrackingType) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            tracking_id: Uuid::new_v4().to_string(),
            batch_id: batch_id.to_string(),
            fecha_seguimiento,
            registrado_por: None,
            tipo_seguimiento,
            huevos_totales: 0,
            huevos_rotos: 0,
            huevos_sucios: 0,
            peso_promedio_ave: 0.0,
            consumo_alimento_kg: 0.0,
            consumo_agua_litros: None,
            temperatura_min: None,
            temperatura_max: None,
            humedad: None,
            mortalidad: 0,
            causa_mortalidad: String::new(),
            observaciones: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sellable eggs of the day
    pub fn huevos_buenos(&self) -> i64 {
        (self.huevos_totales - self.huevos_rotos - self.huevos_sucios).max(0)
    }
}

// ==========================================
// GrowthDetail (Seguimiento de Engorde)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthDetail {
    pub tracking_id: String, // 1:1 with DailyTrackingRecord

    // ===== Growth =====
    pub ganancia_diaria_peso: f64, // g
    pub conversion_alimenticia: Option<f64>,
    pub uniformidad: Uniformity,
    pub indice_productividad: Option<f64>,
    /// FCR / index typed by the user rather than derived
    pub conversion_manual: bool,
    pub indice_manual: bool,

    // ===== Nutritional efficiency (derived) =====
    pub consumo_energia: Option<f64>,           // kcal
    pub consumo_proteina: Option<f64>,          // g
    pub eficiencia_energetica: Option<f64>,     // kcal / g gain
    pub eficiencia_proteica: Option<f64>,       // g protein / g gain
    pub relacion_energia_proteina: Option<f64>, // kcal / g protein

    // ===== Body measurements =====
    pub longitud_corporal: Option<f64>, // cm
    pub ancho_pechuga: Option<f64>,     // cm

    // ===== Health scores (1-5) =====
    pub calidad_plumaje: Option<i64>,
    pub calidad_patas: Option<i64>,

    pub observaciones_engorde: String,
    pub calculated_at: NaiveDateTime,
}

/// Caller-supplied part of a growth detail; the rest is derived on save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthDetailInput {
    pub ganancia_diaria_peso: f64,
    /// Derived from the previous record when absent
    pub conversion_alimenticia: Option<f64>,
    pub uniformidad: Uniformity,
    /// Derived from weight/survival/age/FCR when absent
    pub indice_productividad: Option<f64>,
    pub longitud_corporal: Option<f64>,
    pub ancho_pechuga: Option<f64>,
    pub calidad_plumaje: Option<i64>,
    pub calidad_patas: Option<i64>,
    pub observaciones_engorde: String,
}

impl GrowthDetailInput {
    pub fn new(ganancia_diaria_peso: f64, uniformidad: Uniformity) -> Self {
        Self {
            ganancia_diaria_peso,
            conversion_alimenticia: None,
            uniformidad,
            indice_productividad: None,
            longitud_corporal: None,
            ancho_pechuga: None,
            calidad_plumaje: None,
            calidad_patas: None,
            observaciones_engorde: String::new(),
        }
    }

    pub fn with_conversion(mut self, conversion_alimenticia: f64) -> Self {
        self.conversion_alimenticia = Some(conversion_alimenticia);
        self
    }
}

/// Input that reproduces a stored detail; derived FCR / index are
/// dropped so the next save recomputes them
impl From<&GrowthDetail> for GrowthDetailInput {
    fn from(d: &GrowthDetail) -> Self {
        Self {
            ganancia_diaria_peso: d.ganancia_diaria_peso,
            conversion_alimenticia: d.conversion_alimenticia.filter(|_| d.conversion_manual),
            uniformidad: d.uniformidad,
            indice_productividad: d.indice_productividad.filter(|_| d.indice_manual),
            longitud_corporal: d.longitud_corporal,
            ancho_pechuga: d.ancho_pechuga,
            calidad_plumaje: d.calidad_plumaje,
            calidad_patas: d.calidad_patas,
            observaciones_engorde: d.observaciones_engorde.clone(),
        }
    }
}

// ==========================================
// GrowthObservation - read model
// ==========================================
// Growth detail joined with its tracking record, batch and feed.
// Input of the aggregation and recommendation engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthObservation {
    pub tracking_id: String,
    pub batch_id: String,
    pub codigo_lote: String,
    pub shed_id: String,
    pub fecha_seguimiento: NaiveDate,
    pub peso_promedio_ave: f64,

    pub ganancia_diaria_peso: f64,
    pub conversion_alimenticia: Option<f64>,
    pub eficiencia_energetica: Option<f64>,
    pub eficiencia_proteica: Option<f64>,
    pub relacion_energia_proteina: Option<f64>,

    pub feed_id: Option<String>,
    pub feed_nombre: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huevos_buenos() {
        let mut r = DailyTrackingRecord::new(
            "b1",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            TrackingType::Produccion,
        );
        r.huevos_totales = 900;
        r.huevos_rotos = 12;
        r.huevos_sucios = 8;
        assert_eq!(r.huevos_buenos(), 880);
    }

    #[test]
    fn test_input_from_detail_keeps_only_manual_values() {
        let mut detail = GrowthDetail {
            tracking_id: "t1".to_string(),
            ganancia_diaria_peso: 55.0,
            conversion_alimenticia: Some(1.8),
            uniformidad: Uniformity::Regular,
            indice_productividad: Some(310.0),
            conversion_manual: false,
            indice_manual: false,
            consumo_energia: None,
            consumo_proteina: None,
            eficiencia_energetica: None,
            eficiencia_proteica: None,
            relacion_energia_proteina: None,
            longitud_corporal: Some(30.0),
            ancho_pechuga: None,
            calidad_plumaje: Some(4),
            calidad_patas: None,
            observaciones_engorde: "ok".to_string(),
            calculated_at: Utc::now().naive_utc(),
        };
        let input = GrowthDetailInput::from(&detail);
        assert_eq!(input.conversion_alimenticia, None);
        assert_eq!(input.indice_productividad, None);
        assert_eq!(input.longitud_corporal, Some(30.0));
        assert_eq!(input.calidad_plumaje, Some(4));

        detail.conversion_manual = true;
        let input = GrowthDetailInput::from(&detail);
        assert_eq!(input.conversion_alimenticia, Some(1.8));
        assert_eq!(input.indice_productividad, None);
    }
}
