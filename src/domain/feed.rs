// ==========================================
// App Granja - Feed domain model
// ==========================================
// Read-only input of the efficiency calculation
// ==========================================

use crate::domain::types::FeedStage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Feed (Alimento) with its nutritional profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub feed_id: String,
    pub codigo: Option<String>,
    pub nombre: String,
    pub etapa: FeedStage,

    // ===== Nutritional profile =====
    pub contenido_proteina: Option<f64>,    // % by weight
    pub energia_metabolizable: Option<f64>, // kcal/kg

    pub precio_kg: f64,
    pub activo: bool,
}

impl Feed {
    pub fn new(nombre: &str, etapa: FeedStage, contenido_proteina: f64, energia_metabolizable: f64) -> Self {
        Self {
            feed_id: Uuid::new_v4().to_string(),
            codigo: None,
            nombre: nombre.to_string(),
            etapa,
            contenido_proteina: Some(contenido_proteina),
            energia_metabolizable: Some(energia_metabolizable),
            precio_kg: 0.0,
            activo: true,
        }
    }
}
