// ==========================================
// App Granja - API layer
// ==========================================
// Entry points used by the CLI and the importer
// ==========================================

pub mod access_api;
pub mod error;
pub mod mortality_api;
pub mod recommendation_api;
pub mod statistics_api;
pub mod tracking_api;

pub use access_api::AccessApi;
pub use error::{ApiError, ApiResult};
pub use mortality_api::MortalityApi;
pub use recommendation_api::{
    AnalysisReport, BatchInfo, BestRecord, NutritionalAnalysis, RecommendationApi, RecommendedFeed,
    ShedInfo,
};
pub use statistics_api::{DashboardStatistics, InventorySummary, ShedComparison, StatisticsApi};
pub use tracking_api::{RecalcSkipReason, RecalcSummary, TrackingApi};

use chrono::{Duration, NaiveDate};

/// First day of a `dias`-day lookback ending at `hoy`
pub(crate) fn lookback_start(hoy: NaiveDate, dias: i64) -> ApiResult<NaiveDate> {
    if dias < 0 {
        return Err(ApiError::InvalidInput(format!("dias no puede ser negativo: {}", dias)));
    }
    Duration::try_days(dias)
        .and_then(|d| hoy.checked_sub_signed(d))
        .ok_or_else(|| ApiError::InvalidInput(format!("ventana de {} días fuera de rango", dias)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_start_bounds() {
        let hoy = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        assert_eq!(lookback_start(hoy, 0).unwrap(), hoy);
        assert_eq!(
            lookback_start(hoy, 30).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 19).unwrap()
        );
        assert!(matches!(lookback_start(hoy, -1), Err(ApiError::InvalidInput(_))));
        assert!(matches!(lookback_start(hoy, 100_000_000), Err(ApiError::InvalidInput(_))));
        assert!(matches!(lookback_start(hoy, i64::MAX), Err(ApiError::InvalidInput(_))));
    }
}
