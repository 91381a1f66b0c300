// ==========================================
// App Granja - Engine layer
// ==========================================
// Business rules only: engines never build SQL.
// Inputs are domain values loaded by the API layer.
// ==========================================

pub mod aggregation;
pub mod efficiency;
pub mod growth;
pub mod recommendation;

pub use aggregation::{GrowthStatistics, GrowthSummary, PeriodWindow, Series, SumSeries};
pub use efficiency::{EfficiencyCalculator, NutritionalEfficiency};
pub use growth::{GrowthContext, GrowthEngine, GrowthRuleError};
pub use recommendation::{EfficiencyStats, Recommendation, RecommendationEngine};
