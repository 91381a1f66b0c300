// ==========================================
// App Granja - Recommendation configuration
// ==========================================
// Threshold constants of the efficiency analysis.
// Read through a trait so engines/tests can run without a database.
// ==========================================

use serde::{Deserialize, Serialize};
use std::error::Error;

/// Tier thresholds and data requirements of the efficiency analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyThresholds {
    /// kcal/g above which energy efficiency is an alert
    pub energia_alerta: f64,
    /// kcal/g above which energy efficiency is a warning
    pub energia_advertencia: f64,
    /// g/g above which protein efficiency is an alert
    pub proteina_alerta: f64,
    /// g/g above which protein efficiency is a warning
    pub proteina_advertencia: f64,
    /// energy:protein ratio outside [min, max] is an alert
    pub relacion_alerta_min: f64,
    pub relacion_alerta_max: f64,
    /// energy:protein ratio outside [min, max] is a warning
    pub relacion_optima_min: f64,
    pub relacion_optima_max: f64,
    /// Minimum qualifying records to produce an analysis
    pub min_registros: usize,
    /// Default lookback window (days)
    pub dias_analisis: i64,
}

impl Default for EfficiencyThresholds {
    fn default() -> Self {
        Self {
            energia_alerta: 3.5,
            energia_advertencia: 3.0,
            proteina_alerta: 0.45,
            proteina_advertencia: 0.40,
            relacion_alerta_min: 130.0,
            relacion_alerta_max: 170.0,
            relacion_optima_min: 140.0,
            relacion_optima_max: 160.0,
            min_registros: 3,
            dias_analisis: 30,
        }
    }
}

impl EfficiencyThresholds {
    /// Warning bounds must sit inside alert bounds
    pub fn is_consistent(&self) -> bool {
        self.energia_advertencia <= self.energia_alerta
            && self.proteina_advertencia <= self.proteina_alerta
            && self.relacion_alerta_min <= self.relacion_optima_min
            && self.relacion_optima_min <= self.relacion_optima_max
            && self.relacion_optima_max <= self.relacion_alerta_max
    }
}

pub trait RecommendationConfigReader {
    fn get_efficiency_thresholds(&self) -> Result<EfficiencyThresholds, Box<dyn Error>>;
}

/// Fixed thresholds (tests, tools without a config table)
pub struct StaticRecommendationConfig(pub EfficiencyThresholds);

impl RecommendationConfigReader for StaticRecommendationConfig {
    fn get_efficiency_thresholds(&self) -> Result<EfficiencyThresholds, Box<dyn Error>> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_consistent() {
        let t = EfficiencyThresholds::default();
        assert!(t.is_consistent());
        assert_eq!(t.min_registros, 3);
        assert_eq!(t.dias_analisis, 30);
    }

    #[test]
    fn test_inverted_bounds_are_flagged() {
        let t = EfficiencyThresholds {
            relacion_optima_min: 120.0,
            ..EfficiencyThresholds::default()
        };
        assert!(!t.is_consistent());
    }
}
