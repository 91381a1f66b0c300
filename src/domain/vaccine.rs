// ==========================================
// App Granja - Vaccine (Vacuna) stock item
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vaccine {
    pub vaccine_id: String,
    pub nombre_comercial: String,
    /// Active ingredient or disease prevented
    pub principio_activo: String,
    pub lote_fabricante: String,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub stock_ml: f64,
    pub precio_ml: f64,
    pub activo: bool,
}

impl Vaccine {
    pub fn new(nombre_comercial: &str, principio_activo: &str, precio_ml: f64) -> Self {
        Self {
            vaccine_id: Uuid::new_v4().to_string(),
            nombre_comercial: nombre_comercial.to_string(),
            principio_activo: principio_activo.to_string(),
            lote_fabricante: String::new(),
            fecha_vencimiento: None,
            stock_ml: 0.0,
            precio_ml,
            activo: true,
        }
    }

    pub fn is_expired(&self, hoy: NaiveDate) -> bool {
        self.fecha_vencimiento.is_some_and(|v| v < hoy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let hoy = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut v = Vaccine::new("Newcastle B1", "Newcastle", 0.8);
        assert!(!v.is_expired(hoy));
        v.fecha_vencimiento = NaiveDate::from_ymd_opt(2024, 5, 31);
        assert!(v.is_expired(hoy));
        v.fecha_vencimiento = Some(hoy);
        assert!(!v.is_expired(hoy));
    }
}
