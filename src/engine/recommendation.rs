// ==========================================
// App Granja - Feed efficiency recommendations
// ==========================================
// Threshold rules over the window averages. Thresholds come from
// configuration; messages from the active locale.
// ==========================================

use crate::config::recommendation_config::EfficiencyThresholds;
use crate::domain::tracking::GrowthObservation;
use crate::domain::types::{RecommendationTier, ShedType};
use crate::i18n::{t, t_with_args};
use serde::{Deserialize, Serialize};

/// One recommendation line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub tipo: RecommendationTier,
    pub mensaje: String,
    pub accion: String,
}

impl Recommendation {
    fn localized(tipo: RecommendationTier, key: &str, args: &[(&str, &str)]) -> Self {
        Self {
            tipo,
            mensaje: t_with_args(&format!("{}.mensaje", key), args),
            accion: t_with_args(&format!("{}.accion", key), args),
        }
    }
}

/// Window statistics over the qualifying records
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyStats {
    pub avg_eficiencia_energetica: f64,
    pub min_eficiencia_energetica: f64,
    pub max_eficiencia_energetica: f64,
    pub avg_eficiencia_proteica: f64,
    pub min_eficiencia_proteica: f64,
    pub max_eficiencia_proteica: f64,
    /// None when no record carries a ratio
    pub avg_relacion_energia_proteina: Option<f64>,
}

pub struct RecommendationEngine {
    thresholds: EfficiencyThresholds,
}

impl RecommendationEngine {
    pub fn new(thresholds: EfficiencyThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &EfficiencyThresholds {
        &self.thresholds
    }

    pub fn has_enough_data(&self, n: usize) -> bool {
        n >= self.thresholds.min_registros
    }

    // ==========================================
    // Statistics
    // ==========================================

    /// Stats of records with both efficiencies (None if there are none)
    pub fn stats(obs: &[GrowthObservation]) -> Option<EfficiencyStats> {
        let pairs: Vec<(f64, f64)> = obs
            .iter()
            .filter_map(|o| Some((o.eficiencia_energetica?, o.eficiencia_proteica?)))
            .collect();
        if pairs.is_empty() {
            return None;
        }

        let n = pairs.len() as f64;
        let (mut ee_sum, mut ep_sum) = (0.0, 0.0);
        let (mut ee_min, mut ee_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut ep_min, mut ep_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for (ee, ep) in &pairs {
            ee_sum += ee;
            ep_sum += ep;
            ee_min = ee_min.min(*ee);
            ee_max = ee_max.max(*ee);
            ep_min = ep_min.min(*ep);
            ep_max = ep_max.max(*ep);
        }

        let ratios: Vec<f64> = obs.iter().filter_map(|o| o.relacion_energia_proteina).collect();
        let avg_ratio = if ratios.is_empty() {
            None
        } else {
            Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
        };

        Some(EfficiencyStats {
            avg_eficiencia_energetica: ee_sum / n,
            min_eficiencia_energetica: ee_min,
            max_eficiencia_energetica: ee_max,
            avg_eficiencia_proteica: ep_sum / n,
            min_eficiencia_proteica: ep_min,
            max_eficiencia_proteica: ep_max,
            avg_relacion_energia_proteina: avg_ratio,
        })
    }

    /// Lowest energy efficiency; first one wins on ties
    pub fn best_record(obs: &[GrowthObservation]) -> Option<&GrowthObservation> {
        obs.iter()
            .filter(|o| o.eficiencia_energetica.is_some())
            .fold(None, |best: Option<&GrowthObservation>, o| match best {
                Some(b) if b.eficiencia_energetica <= o.eficiencia_energetica => Some(b),
                _ => Some(o),
            })
    }

    // ==========================================
    // Tiers
    // ==========================================

    pub fn classify_energy(&self, avg: f64) -> RecommendationTier {
        if avg > self.thresholds.energia_alerta {
            RecommendationTier::Alerta
        } else if avg > self.thresholds.energia_advertencia {
            RecommendationTier::Advertencia
        } else {
            RecommendationTier::Positivo
        }
    }

    pub fn classify_protein(&self, avg: f64) -> RecommendationTier {
        if avg > self.thresholds.proteina_alerta {
            RecommendationTier::Alerta
        } else if avg > self.thresholds.proteina_advertencia {
            RecommendationTier::Advertencia
        } else {
            RecommendationTier::Positivo
        }
    }

    pub fn classify_ratio(&self, avg: f64) -> RecommendationTier {
        let t = &self.thresholds;
        if avg < t.relacion_alerta_min || avg > t.relacion_alerta_max {
            RecommendationTier::Alerta
        } else if avg < t.relacion_optima_min || avg > t.relacion_optima_max {
            RecommendationTier::Advertencia
        } else {
            RecommendationTier::Positivo
        }
    }

    // ==========================================
    // Recommendations
    // ==========================================

    /// Energy, protein and (when available) ratio recommendations, in that order
    pub fn evaluate(&self, stats: &EfficiencyStats) -> Vec<Recommendation> {
        let t = &self.thresholds;
        let mut out = Vec::with_capacity(3);

        let tier = self.classify_energy(stats.avg_eficiencia_energetica);
        let umbral = match tier {
            RecommendationTier::Alerta => t.energia_alerta,
            _ => t.energia_advertencia,
        };
        out.push(Recommendation::localized(
            tier,
            &format!("recomendacion.energia.{}", tier),
            &[("umbral", &format!("{:.1}", umbral))],
        ));

        let tier = self.classify_protein(stats.avg_eficiencia_proteica);
        let umbral = match tier {
            RecommendationTier::Alerta => t.proteina_alerta,
            _ => t.proteina_advertencia,
        };
        out.push(Recommendation::localized(
            tier,
            &format!("recomendacion.proteina.{}", tier),
            &[("umbral", &format!("{:.2}", umbral))],
        ));

        if let Some(ratio) = stats.avg_relacion_energia_proteina {
            let tier = self.classify_ratio(ratio);
            out.push(Recommendation::localized(
                tier,
                &format!("recomendacion.relacion.{}", tier),
                &[
                    ("valor", &format!("{:.1}", ratio)),
                    ("min", &format!("{:.0}", t.relacion_optima_min)),
                    ("max", &format!("{:.0}", t.relacion_optima_max)),
                ],
            ));
        }

        out
    }

    pub fn best_feed(feed_nombre: &str) -> Recommendation {
        Recommendation::localized(
            RecommendationTier::Informacion,
            "recomendacion.mejor_alimento",
            &[("alimento", feed_nombre)],
        )
    }

    /// Stage advice by batch age in weeks
    pub fn batch_age(edad_semanas: i64) -> Recommendation {
        let key = if edad_semanas < 3 {
            "recomendacion.edad.inicial"
        } else if edad_semanas < 6 {
            "recomendacion.edad.crecimiento"
        } else {
            "recomendacion.edad.finalizacion"
        };
        Recommendation::localized(RecommendationTier::Informacion, key, &[])
    }

    /// Shed-type advice; only rearing and laying sheds get one
    pub fn shed_type(tipo: ShedType) -> Option<Recommendation> {
        let key = match tipo {
            ShedType::Cria => "recomendacion.galpon.cria",
            ShedType::Postura => "recomendacion.galpon.postura",
            _ => return None,
        };
        Some(Recommendation::localized(RecommendationTier::Informacion, key, &[]))
    }

    pub fn insufficient_data_message(&self) -> String {
        t_with_args(
            "recomendacion.datos_insuficientes",
            &[("min", &self.thresholds.min_registros.to_string())],
        )
    }

    pub fn unspecified_feed() -> String {
        t("recomendacion.alimento_no_especificado")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(day: u32, ee: f64, ep: f64, ratio: Option<f64>) -> GrowthObservation {
        GrowthObservation {
            tracking_id: format!("t{}", day),
            batch_id: "b1".into(),
            codigo_lote: "L-1".into(),
            shed_id: "g1".into(),
            fecha_seguimiento: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            peso_promedio_ave: 1.2,
            ganancia_diaria_peso: 55.0,
            conversion_alimenticia: None,
            eficiencia_energetica: Some(ee),
            eficiencia_proteica: Some(ep),
            relacion_energia_proteina: ratio,
            feed_id: None,
            feed_nombre: None,
        }
    }

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(EfficiencyThresholds::default())
    }

    #[test]
    fn test_energy_tiers() {
        let e = engine();
        assert_eq!(e.classify_energy(4.0), RecommendationTier::Alerta);
        assert_eq!(e.classify_energy(3.2), RecommendationTier::Advertencia);
        assert_eq!(e.classify_energy(3.0), RecommendationTier::Positivo);
        assert_eq!(e.classify_energy(2.0), RecommendationTier::Positivo);
    }

    #[test]
    fn test_protein_and_ratio_tiers() {
        let e = engine();
        assert_eq!(e.classify_protein(0.5), RecommendationTier::Alerta);
        assert_eq!(e.classify_protein(0.42), RecommendationTier::Advertencia);
        assert_eq!(e.classify_protein(0.40), RecommendationTier::Positivo);

        assert_eq!(e.classify_ratio(120.0), RecommendationTier::Alerta);
        assert_eq!(e.classify_ratio(175.0), RecommendationTier::Alerta);
        assert_eq!(e.classify_ratio(135.0), RecommendationTier::Advertencia);
        assert_eq!(e.classify_ratio(165.0), RecommendationTier::Advertencia);
        assert_eq!(e.classify_ratio(150.0), RecommendationTier::Positivo);
    }

    #[test]
    fn test_custom_thresholds_shift_tiers() {
        let e = RecommendationEngine::new(EfficiencyThresholds {
            energia_alerta: 5.0,
            energia_advertencia: 4.5,
            ..EfficiencyThresholds::default()
        });
        assert_eq!(e.classify_energy(4.0), RecommendationTier::Positivo);
    }

    #[test]
    fn test_stats_and_best_record() {
        let rows = vec![
            obs(1, 3.0, 0.40, Some(150.0)),
            obs(2, 2.5, 0.50, None),
            obs(3, 4.0, 0.30, Some(140.0)),
        ];
        let s = RecommendationEngine::stats(&rows).unwrap();
        assert!((s.avg_eficiencia_energetica - 3.166_666_666).abs() < 1e-6);
        assert_eq!(s.min_eficiencia_energetica, 2.5);
        assert_eq!(s.max_eficiencia_proteica, 0.50);
        assert_eq!(s.avg_relacion_energia_proteina, Some(145.0));
        assert_eq!(RecommendationEngine::best_record(&rows).unwrap().tracking_id, "t2");
        assert!(RecommendationEngine::stats(&[]).is_none());
    }

    #[test]
    fn test_ratio_skipped_without_data() {
        let rows = vec![obs(1, 2.0, 0.3, None), obs(2, 2.0, 0.3, None), obs(3, 2.0, 0.3, None)];
        let s = RecommendationEngine::stats(&rows).unwrap();
        let recs = engine().evaluate(&s);
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.tipo == RecommendationTier::Positivo));
    }

    #[test]
    fn test_age_and_shed_advice() {
        assert_eq!(RecommendationEngine::batch_age(2).tipo, RecommendationTier::Informacion);
        assert!(RecommendationEngine::shed_type(ShedType::Cria).is_some());
        assert!(RecommendationEngine::shed_type(ShedType::Postura).is_some());
        assert!(RecommendationEngine::shed_type(ShedType::Cuarentena).is_none());
    }
}
