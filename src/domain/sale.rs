// ==========================================
// App Granja - Sale (Venta) domain model
// ==========================================
// Sale header (revenue series) and its per-egg-type lines
// (egg type distribution)
// ==========================================

use crate::domain::types::EggClass;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub sale_id: String,
    pub cliente: String,
    pub fecha_venta: NaiveDateTime,
    pub subtotal: f64,
    pub impuesto: f64,
    pub total_venta: f64,
    pub vendedor: Option<String>,
    pub observaciones: String,
}

impl Sale {
    pub fn new(cliente: &str, subtotal: f64, impuesto: f64) -> Self {
        Self {
            sale_id: Uuid::new_v4().to_string(),
            cliente: cliente.to_string(),
            fecha_venta: Utc::now().naive_utc(),
            subtotal,
            impuesto,
            total_venta: subtotal + impuesto,
            vendedor: None,
            observaciones: String::new(),
        }
    }
}

/// Egg classification row; one per `EggClass`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EggType {
    pub egg_type_id: String,
    pub clasificacion: EggClass,
    pub descripcion: String,
}

impl EggType {
    pub fn new(clasificacion: EggClass) -> Self {
        Self {
            egg_type_id: Uuid::new_v4().to_string(),
            clasificacion,
            descripcion: String::new(),
        }
    }
}

/// One line of a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub item_id: String,
    pub sale_id: String,
    pub egg_type_id: String,
    pub cantidad: i64, // units
    pub precio_unitario: f64,
    pub subtotal_item: f64,
}

impl SaleItem {
    pub fn new(sale_id: &str, egg_type_id: &str, cantidad: i64, precio_unitario: f64) -> Self {
        Self {
            item_id: Uuid::new_v4().to_string(),
            sale_id: sale_id.to_string(),
            egg_type_id: egg_type_id.to_string(),
            cantidad,
            precio_unitario,
            subtotal_item: cantidad as f64 * precio_unitario,
        }
    }
}
