// ==========================================
// App Granja - Farm / shed / breed domain model
// ==========================================

use crate::domain::types::{FarmState, ShedType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Farm (Granja)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    pub farm_id: String,
    pub codigo_granja: String, // unique
    pub nombre: String,
    pub direccion: String,
    pub capacidad_total_aves: i64,
    pub estado: FarmState,
}

impl Farm {
    pub fn new(codigo_granja: &str, nombre: &str, direccion: &str) -> Self {
        Self {
            farm_id: Uuid::new_v4().to_string(),
            codigo_granja: codigo_granja.to_string(),
            nombre: nombre.to_string(),
            direccion: direccion.to_string(),
            capacidad_total_aves: 0,
            estado: FarmState::Activa,
        }
    }
}

// ==========================================
// Shed (Galpón)
// ==========================================
// Invariant: numero_galpon is unique within a farm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shed {
    pub shed_id: String,
    pub farm_id: String,
    pub numero_galpon: String,
    pub tipo_galpon: ShedType,
    pub capacidad_aves: i64,
    pub area_metros_cuadrados: Option<f64>,
}

impl Shed {
    pub fn new(farm_id: &str, numero_galpon: &str, tipo_galpon: ShedType, capacidad_aves: i64) -> Self {
        Self {
            shed_id: Uuid::new_v4().to_string(),
            farm_id: farm_id.to_string(),
            numero_galpon: numero_galpon.to_string(),
            tipo_galpon,
            capacidad_aves,
            area_metros_cuadrados: None,
        }
    }

    /// Birds per square metre, when the area is known
    pub fn densidad(&self, aves: i64) -> Option<f64> {
        match self.area_metros_cuadrados {
            Some(area) if area > 0.0 => Some(aves as f64 / area),
            _ => None,
        }
    }
}

// ==========================================
// Breed (Raza)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breed {
    pub breed_id: String,
    pub nombre: String,
}

impl Breed {
    pub fn new(nombre: &str) -> Self {
        Self {
            breed_id: Uuid::new_v4().to_string(),
            nombre: nombre.to_string(),
        }
    }
}
