// ==========================================
// App Granja - Batch (Lote) domain model
// ==========================================
// Aggregate root: shed + breed + feed + initial flock
// ==========================================

use crate::domain::types::BatchState;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: String,
    pub shed_id: String,
    pub breed_id: String,
    pub feed_id: Option<String>,

    pub codigo_lote: String, // unique
    pub fecha_inicio: NaiveDate,
    pub cantidad_inicial_aves: i64,
    pub edad_inicial_semanas: i64,
    pub estado: BatchState,
}

impl Batch {
    pub fn new(
        shed_id: &str,
        breed_id: &str,
        codigo_lote: &str,
        fecha_inicio: NaiveDate,
        cantidad_inicial_aves: i64,
    ) -> Self {
        Self {
            batch_id: Uuid::new_v4().to_string(),
            shed_id: shed_id.to_string(),
            breed_id: breed_id.to_string(),
            feed_id: None,
            codigo_lote: codigo_lote.to_string(),
            fecha_inicio,
            cantidad_inicial_aves,
            edad_inicial_semanas: 0,
            estado: BatchState::Inicial,
        }
    }

    /// Days since the batch started (negative before the start date)
    pub fn edad_dias(&self, fecha: NaiveDate) -> i64 {
        (fecha - self.fecha_inicio).num_days()
    }

    /// Age in weeks on the given date: initial age + whole weeks elapsed
    pub fn edad_semanas(&self, fecha: NaiveDate) -> i64 {
        self.edad_inicial_semanas + self.edad_dias(fecha).max(0) / 7
    }

    /// Birds present given the cumulative mortality up to some date
    pub fn aves_presentes(&self, muertes_acumuladas: i64) -> i64 {
        (self.cantidad_inicial_aves - muertes_acumuladas).max(0)
    }

    /// Survival percentage (0 when the batch started empty)
    pub fn supervivencia_pct(&self, aves_presentes: i64) -> f64 {
        if self.cantidad_inicial_aves <= 0 {
            return 0.0;
        }
        aves_presentes as f64 / self.cantidad_inicial_aves as f64 * 100.0
    }
}
