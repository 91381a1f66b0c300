// ==========================================
// App Granja - Period aggregation
// ==========================================
// Trailing windows and time buckets for the chart series.
// Series are sparse: a bucket exists only if some row fell in it.
// Every function takes the reference date explicitly.
// ==========================================

use crate::domain::tracking::GrowthObservation;
use crate::domain::types::Period;
use crate::i18n::t;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive date window ending at the reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub inicio: NaiveDate,
    pub fin: NaiveDate,
}

impl PeriodWindow {
    /// dia: last 7 days; semana: last 8 weeks; mes: last 6 months from the 1st
    pub fn trailing(periodo: Period, hoy: NaiveDate) -> Self {
        let inicio = match periodo {
            Period::Dia => hoy - Duration::days(6),
            Period::Semana => hoy - Duration::weeks(7),
            Period::Mes => first_of_month(hoy - Duration::days(180)),
        };
        Self { inicio, fin: hoy }
    }

    pub fn contains(&self, fecha: NaiveDate) -> bool {
        fecha >= self.inicio && fecha <= self.fin
    }
}

fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

/// Bucket key of a date: the day, the ISO Monday, or the 1st of the month
pub fn bucket_of(periodo: Period, fecha: NaiveDate) -> NaiveDate {
    match periodo {
        Period::Dia => fecha,
        Period::Semana => fecha - Duration::days(fecha.weekday().num_days_from_monday() as i64),
        Period::Mes => first_of_month(fecha),
    }
}

pub fn label_of(periodo: Period, bucket: NaiveDate) -> String {
    match periodo {
        Period::Dia => bucket.format("%d/%m").to_string(),
        Period::Semana => bucket.format("Sem %W").to_string(),
        Period::Mes => format!("{} {}", t(&format!("periodo.mes_{}", bucket.month())), bucket.year()),
    }
}

// ==========================================
// Sum series
// ==========================================

/// `{ labels, datos }` chart series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub datos: Vec<f64>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Sums values per bucket
#[derive(Debug)]
pub struct SumSeries {
    periodo: Period,
    buckets: BTreeMap<NaiveDate, f64>,
}

impl SumSeries {
    pub fn new(periodo: Period) -> Self {
        Self {
            periodo,
            buckets: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, fecha: NaiveDate, valor: f64) {
        *self.buckets.entry(bucket_of(self.periodo, fecha)).or_insert(0.0) += valor;
    }

    pub fn finish(self) -> Series {
        let periodo = self.periodo;
        let (labels, datos) = self
            .buckets
            .into_iter()
            .map(|(bucket, total)| (label_of(periodo, bucket), total))
            .unzip();
        Series { labels, datos }
    }
}

// ==========================================
// Growth averages
// ==========================================

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    n: u32,
}

impl Mean {
    fn push(&mut self, v: Option<f64>) {
        if let Some(v) = v {
            self.sum += v;
            self.n += 1;
        }
    }

    /// Empty average reads as 0
    fn value(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.sum / self.n as f64
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct GrowthBucket {
    peso: Mean,
    ganancia: Mean,
    conversion: Mean,
    eficiencia_energetica: Mean,
    eficiencia_proteica: Mean,
    relacion_energia_proteina: Mean,
}

/// Per-bucket averages of the growth metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthStatistics {
    pub labels: Vec<String>,
    pub datos_peso: Vec<f64>,
    pub datos_ganancia: Vec<f64>,
    pub datos_conversion: Vec<f64>,
    pub datos_eficiencia_energetica: Vec<f64>,
    pub datos_eficiencia_proteica: Vec<f64>,
    pub datos_relacion_energia_proteina: Vec<f64>,
}

impl GrowthStatistics {
    pub fn from_observations(periodo: Period, obs: &[GrowthObservation]) -> Self {
        let mut buckets: BTreeMap<NaiveDate, GrowthBucket> = BTreeMap::new();
        for o in obs {
            let b = buckets.entry(bucket_of(periodo, o.fecha_seguimiento)).or_default();
            b.peso.push(Some(o.peso_promedio_ave));
            b.ganancia.push(Some(o.ganancia_diaria_peso));
            b.conversion.push(o.conversion_alimenticia);
            b.eficiencia_energetica.push(o.eficiencia_energetica);
            b.eficiencia_proteica.push(o.eficiencia_proteica);
            b.relacion_energia_proteina.push(o.relacion_energia_proteina);
        }

        let mut out = GrowthStatistics::default();
        for (bucket, b) in buckets {
            out.labels.push(label_of(periodo, bucket));
            out.datos_peso.push(b.peso.value());
            out.datos_ganancia.push(b.ganancia.value());
            out.datos_conversion.push(b.conversion.value());
            out.datos_eficiencia_energetica.push(b.eficiencia_energetica.value());
            out.datos_eficiencia_proteica.push(b.eficiencia_proteica.value());
            out.datos_relacion_energia_proteina.push(b.relacion_energia_proteina.value());
        }
        out
    }

    /// Mean over buckets of each series (0 when there are none)
    pub fn overall(&self) -> GrowthSummary {
        fn avg(v: &[f64]) -> f64 {
            if v.is_empty() {
                0.0
            } else {
                v.iter().sum::<f64>() / v.len() as f64
            }
        }
        GrowthSummary {
            peso: avg(&self.datos_peso),
            ganancia: avg(&self.datos_ganancia),
            conversion: avg(&self.datos_conversion),
            eficiencia_energetica: avg(&self.datos_eficiencia_energetica),
            eficiencia_proteica: avg(&self.datos_eficiencia_proteica),
            relacion_energia_proteina: avg(&self.datos_relacion_energia_proteina),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthSummary {
    pub peso: f64,
    pub ganancia: f64,
    pub conversion: f64,
    pub eficiencia_energetica: f64,
    pub eficiencia_proteica: f64,
    pub relacion_energia_proteina: f64,
}
