// ==========================================
// App Granja - Nutritional efficiency calculator
// ==========================================
// Pure function of (feed kg, daily gain g, feed profile).
// Missing inputs or non-positive divisors leave fields empty;
// a zero nutrient value counts as missing. Nothing here fails.
// ==========================================

use crate::domain::feed::Feed;
use serde::{Deserialize, Serialize};

/// Derived nutritional metrics of one growth record
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionalEfficiency {
    /// kcal
    pub consumo_energia: Option<f64>,
    /// g
    pub consumo_proteina: Option<f64>,
    /// kcal per g gained
    pub eficiencia_energetica: Option<f64>,
    /// g protein per g gained
    pub eficiencia_proteica: Option<f64>,
    /// kcal per g protein
    pub relacion_energia_proteina: Option<f64>,
}

pub struct EfficiencyCalculator;

impl EfficiencyCalculator {
    /// # Arguments
    /// - `consumo_alimento_kg`: feed consumed on the day
    /// - `ganancia_diaria_peso`: daily weight gain in grams
    /// - `feed`: the batch's feed, if any
    pub fn calculate(
        consumo_alimento_kg: f64,
        ganancia_diaria_peso: f64,
        feed: Option<&Feed>,
    ) -> NutritionalEfficiency {
        let feed = match feed {
            Some(f) => f,
            None => return NutritionalEfficiency::default(),
        };
        if consumo_alimento_kg <= 0.0 {
            return NutritionalEfficiency::default();
        }

        let consumo_energia = feed
            .energia_metabolizable
            .filter(|em| *em > 0.0)
            .map(|em| consumo_alimento_kg * em);
        // protein % of feed kg -> grams: kg * 1000 * pct / 100
        let consumo_proteina = feed
            .contenido_proteina
            .filter(|pct| *pct > 0.0)
            .map(|pct| consumo_alimento_kg * pct * 10.0);

        let per_gain = |total: Option<f64>| -> Option<f64> {
            match total {
                Some(t) if ganancia_diaria_peso > 0.0 => Some(t / ganancia_diaria_peso),
                _ => None,
            }
        };

        let relacion_energia_proteina = match (consumo_energia, consumo_proteina) {
            (Some(e), Some(p)) if p > 0.0 => Some(e / p),
            _ => None,
        };

        NutritionalEfficiency {
            consumo_energia,
            consumo_proteina,
            eficiencia_energetica: per_gain(consumo_energia),
            eficiencia_proteica: per_gain(consumo_proteina),
            relacion_energia_proteina,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::FeedStage;

    fn feed(proteina: f64, energia: f64) -> Feed {
        Feed::new("Engorde Plus", FeedStage::EngordeCrecimiento, proteina, energia)
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|v| (v - b).abs() < 1e-6).unwrap_or(false)
    }

    #[test]
    fn test_reference_day() {
        let r = EfficiencyCalculator::calculate(10.0, 50.0, Some(&feed(18.0, 3000.0)));
        assert!(approx(r.consumo_energia, 30_000.0));
        assert!(approx(r.consumo_proteina, 1_800.0));
        assert!(approx(r.eficiencia_energetica, 600.0));
        assert!(approx(r.eficiencia_proteica, 36.0));
        assert!(approx(r.relacion_energia_proteina, 16.666_666_7));
    }

    #[test]
    fn test_zero_gain_keeps_totals_only() {
        let r = EfficiencyCalculator::calculate(10.0, 0.0, Some(&feed(18.0, 3000.0)));
        assert!(approx(r.consumo_energia, 30_000.0));
        assert!(approx(r.consumo_proteina, 1_800.0));
        assert_eq!(r.eficiencia_energetica, None);
        assert_eq!(r.eficiencia_proteica, None);
        assert!(r.relacion_energia_proteina.is_some());
    }

    #[test]
    fn test_no_feed_or_no_consumption() {
        assert_eq!(
            EfficiencyCalculator::calculate(10.0, 50.0, None),
            NutritionalEfficiency::default()
        );
        assert_eq!(
            EfficiencyCalculator::calculate(0.0, 50.0, Some(&feed(18.0, 3000.0))),
            NutritionalEfficiency::default()
        );
    }

    #[test]
    fn test_missing_protein_leaves_ratio_empty() {
        let mut f = feed(18.0, 3000.0);
        f.contenido_proteina = None;
        let r = EfficiencyCalculator::calculate(10.0, 50.0, Some(&f));
        assert!(approx(r.eficiencia_energetica, 600.0));
        assert_eq!(r.consumo_proteina, None);
        assert_eq!(r.relacion_energia_proteina, None);
    }

    #[test]
    fn test_zero_nutrient_values_count_as_missing() {
        let r = EfficiencyCalculator::calculate(10.0, 50.0, Some(&feed(18.0, 0.0)));
        assert_eq!(r.consumo_energia, None);
        assert_eq!(r.eficiencia_energetica, None);
        assert_eq!(r.relacion_energia_proteina, None);
        assert!(approx(r.eficiencia_proteica, 36.0));

        let r = EfficiencyCalculator::calculate(10.0, 50.0, Some(&feed(0.0, 3000.0)));
        assert_eq!(r.consumo_proteina, None);
        assert_eq!(r.eficiencia_proteica, None);
        assert_eq!(r.relacion_energia_proteina, None);
        assert!(approx(r.eficiencia_energetica, 600.0));
    }

    #[test]
    fn test_recalculation_is_stable() {
        let f = feed(21.5, 2950.0);
        let a = EfficiencyCalculator::calculate(12.3, 48.0, Some(&f));
        let b = EfficiencyCalculator::calculate(12.3, 48.0, Some(&f));
        assert_eq!(a, b);
    }
}
