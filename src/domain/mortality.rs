// ==========================================
// App Granja - Mortality domain model
// ==========================================
// DailyMortality: deaths per (batch, date); source of aves_presentes
// WeeklyMortality: per (batch, ISO week) aggregate, recomputed
//                  explicitly by the daily write path
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMortality {
    pub mortality_id: String,
    pub batch_id: String,
    pub fecha: NaiveDate,
    pub cantidad_muertes: i64,
    pub causa: String,
    pub observaciones: String,
}

impl DailyMortality {
    pub fn new(batch_id: &str, fecha: NaiveDate, cantidad_muertes: i64, causa: &str) -> Self {
        Self {
            mortality_id: Uuid::new_v4().to_string(),
            batch_id: batch_id.to_string(),
            fecha,
            cantidad_muertes,
            causa: causa.to_string(),
            observaciones: String::new(),
        }
    }

    /// (ISO year, ISO week) the record belongs to
    pub fn iso_week(&self) -> (i32, u32) {
        let w = self.fecha.iso_week();
        (w.year(), w.week())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMortality {
    pub batch_id: String,
    pub semana: u32,
    pub anio: i32,
    pub total_muertes: i64,
    pub porcentaje_mortalidad: f64, // of initial birds, 2 decimals
}

impl WeeklyMortality {
    /// Build the aggregate of one ISO week
    pub fn compute(
        batch_id: &str,
        anio: i32,
        semana: u32,
        total_muertes: i64,
        cantidad_inicial_aves: i64,
    ) -> Self {
        let pct = if cantidad_inicial_aves > 0 {
            total_muertes as f64 / cantidad_inicial_aves as f64 * 100.0
        } else {
            0.0
        };
        Self {
            batch_id: batch_id.to_string(),
            semana,
            anio,
            total_muertes,
            porcentaje_mortalidad: (pct * 100.0).round() / 100.0,
        }
    }

    /// Monday and Sunday of the aggregate's ISO week
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let monday = NaiveDate::from_isoywd_opt(self.anio, self.semana, chrono::Weekday::Mon)?;
        let sunday = NaiveDate::from_isoywd_opt(self.anio, self.semana, chrono::Weekday::Sun)?;
        Some((monday, sunday))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekly_percentage_rounding() {
        let w = WeeklyMortality::compute("b1", 2024, 10, 7, 3000);
        assert_eq!(w.porcentaje_mortalidad, 0.23);
        let w = WeeklyMortality::compute("b1", 2024, 10, 7, 0);
        assert_eq!(w.porcentaje_mortalidad, 0.0);
    }

    #[test]
    fn test_iso_week_at_year_boundary() {
        // 2024-12-30 belongs to ISO week 1 of 2025
        let m = DailyMortality::new("b1", NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(), 3, "");
        assert_eq!(m.iso_week(), (2025, 1));
        let w = WeeklyMortality::compute("b1", 2025, 1, 3, 100);
        let (mon, sun) = w.date_range().unwrap();
        assert_eq!(mon, NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
        assert_eq!(sun, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    }
}
