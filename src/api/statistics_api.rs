// ==========================================
// App Granja - Statistics API (read path)
// ==========================================
// Chart series over trailing windows. Pure reads: nothing here
// writes. Every query has an `_at` variant taking the reference date.
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::types::{BatchState, Period, Scope};
use crate::engine::aggregation::{GrowthStatistics, PeriodWindow, Series, SumSeries};
use crate::repository::{
    BatchRepository, DailyTrackingRepository, FarmRepository, FeedRepository,
    GrowthDetailRepository, SaleRepository, VaccineRepository,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lookback of the per-shed mortality column
const SHED_MORTALITY_DAYS: i64 = 30;

const ACTIVE_STATES: [BatchState; 3] = [
    BatchState::Inicial,
    BatchState::Crecimiento,
    BatchState::Produccion,
];

/// Growth means per shed, one entry per shed holding a PRODUCCION batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShedComparison {
    pub labels: Vec<String>,
    pub datos_peso: Vec<f64>,
    pub datos_ganancia: Vec<f64>,
    pub datos_conversion: Vec<f64>,
    pub datos_mortalidad: Vec<f64>,
    pub datos_eficiencia_energetica: Vec<f64>,
    pub datos_eficiencia_proteica: Vec<f64>,
    pub datos_relacion_energia_proteina: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_alimentos: i64,
    pub total_vacunas: i64,
    pub total_lotes: i64,
    pub lotes_activos: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStatistics {
    pub produccion: Series,
    pub mortalidad: Series,
    pub ventas: Series,
    pub tipos_huevo: Series,
    pub inventario: InventorySummary,
    pub engorde: GrowthStatistics,
    pub por_galpon: ShedComparison,
}

pub struct StatisticsApi {
    tracking_repo: Arc<DailyTrackingRepository>,
    growth_repo: Arc<GrowthDetailRepository>,
    sale_repo: Arc<SaleRepository>,
    farm_repo: Arc<FarmRepository>,
    batch_repo: Arc<BatchRepository>,
    feed_repo: Arc<FeedRepository>,
    vaccine_repo: Arc<VaccineRepository>,
}

impl StatisticsApi {
    pub fn new(
        tracking_repo: Arc<DailyTrackingRepository>,
        growth_repo: Arc<GrowthDetailRepository>,
        sale_repo: Arc<SaleRepository>,
        farm_repo: Arc<FarmRepository>,
        batch_repo: Arc<BatchRepository>,
        feed_repo: Arc<FeedRepository>,
        vaccine_repo: Arc<VaccineRepository>,
    ) -> Self {
        Self {
            tracking_repo,
            growth_repo,
            sale_repo,
            farm_repo,
            batch_repo,
            feed_repo,
            vaccine_repo,
        }
    }

    fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    // ==========================================
    // Sum series
    // ==========================================

    /// Eggs laid per bucket within a batch/shed scope
    pub fn obtener_estadisticas_produccion(&self, periodo: Period, scope: &Scope) -> ApiResult<Series> {
        self.obtener_estadisticas_produccion_at(periodo, scope, Self::today())
    }

    pub fn obtener_estadisticas_produccion_at(
        &self,
        periodo: Period,
        scope: &Scope,
        hoy: NaiveDate,
    ) -> ApiResult<Series> {
        let w = PeriodWindow::trailing(periodo, hoy);
        let mut series = SumSeries::new(periodo);
        for r in self.tracking_repo.list_in_range(scope, w.inicio, w.fin)? {
            series.add(r.fecha_seguimiento, r.huevos_totales as f64);
        }
        Ok(series.finish())
    }

    /// Deaths reported on tracking records, only days with deaths
    pub fn obtener_estadisticas_mortalidad(&self, periodo: Period, scope: &Scope) -> ApiResult<Series> {
        self.obtener_estadisticas_mortalidad_at(periodo, scope, Self::today())
    }

    pub fn obtener_estadisticas_mortalidad_at(
        &self,
        periodo: Period,
        scope: &Scope,
        hoy: NaiveDate,
    ) -> ApiResult<Series> {
        let w = PeriodWindow::trailing(periodo, hoy);
        let mut series = SumSeries::new(periodo);
        for r in self.tracking_repo.list_in_range(scope, w.inicio, w.fin)? {
            if r.mortalidad > 0 {
                series.add(r.fecha_seguimiento, r.mortalidad as f64);
            }
        }
        Ok(series.finish())
    }

    /// Sales revenue (total with tax) per bucket
    pub fn obtener_estadisticas_ventas(&self, periodo: Period) -> ApiResult<Series> {
        self.obtener_estadisticas_ventas_at(periodo, Self::today())
    }

    pub fn obtener_estadisticas_ventas_at(&self, periodo: Period, hoy: NaiveDate) -> ApiResult<Series> {
        let w = PeriodWindow::trailing(periodo, hoy);
        let mut series = SumSeries::new(periodo);
        for s in self.sale_repo.list_in_range(w.inicio, w.fin)? {
            series.add(s.fecha_venta.date(), s.total_venta);
        }
        Ok(series.finish())
    }

    /// Units sold per egg class over all sales, largest first
    pub fn obtener_distribucion_tipos_huevo(&self) -> ApiResult<Series> {
        let (labels, datos) = self
            .sale_repo
            .units_by_egg_class()?
            .into_iter()
            .map(|(clase, total)| (clase.display_name().to_string(), total as f64))
            .unzip();
        Ok(Series { labels, datos })
    }

    // ==========================================
    // Growth
    // ==========================================

    pub fn obtener_estadisticas_engorde(&self, periodo: Period, scope: &Scope) -> ApiResult<GrowthStatistics> {
        self.obtener_estadisticas_engorde_at(periodo, scope, Self::today())
    }

    pub fn obtener_estadisticas_engorde_at(
        &self,
        periodo: Period,
        scope: &Scope,
        hoy: NaiveDate,
    ) -> ApiResult<GrowthStatistics> {
        let w = PeriodWindow::trailing(periodo, hoy);
        let obs = self.growth_repo.list_observations(scope, w.inicio, w.fin)?;
        tracing::debug!(periodo = %periodo, registros = obs.len(), "estadisticas de engorde");
        Ok(GrowthStatistics::from_observations(periodo, &obs))
    }

    /// One column per shed holding a PRODUCCION batch
    pub fn obtener_estadisticas_por_galpon(&self, periodo: Period) -> ApiResult<ShedComparison> {
        self.obtener_estadisticas_por_galpon_at(periodo, Self::today())
    }

    pub fn obtener_estadisticas_por_galpon_at(&self, periodo: Period, hoy: NaiveDate) -> ApiResult<ShedComparison> {
        let mut out = ShedComparison::default();
        let desde_mortalidad = hoy - Duration::days(SHED_MORTALITY_DAYS);

        for shed in self.farm_repo.list_sheds_with_batch_state(BatchState::Produccion)? {
            let scope = Scope::Galpon(shed.shed_id.clone());
            let resumen = self.obtener_estadisticas_engorde_at(periodo, &scope, hoy)?.overall();
            let muertes: i64 = self
                .tracking_repo
                .list_in_range(&scope, desde_mortalidad, hoy)?
                .iter()
                .filter(|r| r.mortalidad > 0)
                .map(|r| r.mortalidad)
                .sum();

            out.labels.push(format!("Galpón {}", shed.numero_galpon));
            out.datos_peso.push(resumen.peso);
            out.datos_ganancia.push(resumen.ganancia);
            out.datos_conversion.push(resumen.conversion);
            out.datos_mortalidad.push(muertes as f64);
            out.datos_eficiencia_energetica.push(resumen.eficiencia_energetica);
            out.datos_eficiencia_proteica.push(resumen.eficiencia_proteica);
            out.datos_relacion_energia_proteina.push(resumen.relacion_energia_proteina);
        }
        Ok(out)
    }

    // ==========================================
    // Inventory / dashboard
    // ==========================================

    pub fn obtener_resumen_inventario(&self) -> ApiResult<InventorySummary> {
        Ok(InventorySummary {
            total_alimentos: self.feed_repo.count()?,
            total_vacunas: self.vaccine_repo.count()?,
            total_lotes: self.batch_repo.count()?,
            lotes_activos: self.batch_repo.count_in_states(&ACTIVE_STATES)?,
        })
    }

    pub fn obtener_estadisticas_dashboard(&self) -> ApiResult<DashboardStatistics> {
        self.obtener_estadisticas_dashboard_at(Self::today())
    }

    pub fn obtener_estadisticas_dashboard_at(&self, hoy: NaiveDate) -> ApiResult<DashboardStatistics> {
        Ok(DashboardStatistics {
            produccion: self.obtener_estadisticas_produccion_at(Period::Semana, &Scope::Todos, hoy)?,
            mortalidad: self.obtener_estadisticas_mortalidad_at(Period::Semana, &Scope::Todos, hoy)?,
            ventas: self.obtener_estadisticas_ventas_at(Period::Mes, hoy)?,
            tipos_huevo: self.obtener_distribucion_tipos_huevo()?,
            inventario: self.obtener_resumen_inventario()?,
            engorde: self.obtener_estadisticas_engorde_at(Period::Semana, &Scope::Todos, hoy)?,
            por_galpon: self.obtener_estadisticas_por_galpon_at(Period::Semana, hoy)?,
        })
    }
}
