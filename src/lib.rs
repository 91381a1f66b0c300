// ==========================================
// App Granja - Core library
// ==========================================
// Poultry farm management: daily tracking, growth detail,
// feed efficiency, reporting and recommendations.
// Stack: Rust + SQLite (rusqlite)
// ==========================================

// i18n setup
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// Modules
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Import layer - CSV / Excel
pub mod importer;

// Configuration
pub mod config;

// SQLite connection / schema
pub mod db;

pub mod logging;

pub mod i18n;

// API layer
pub mod api;

// Application wiring
pub mod app;

// ==========================================
// Re-exports
// ==========================================

pub use domain::types::{
    BatchState, EggClass, FeedStage, Period, RecommendationTier, Scope, ShedType, TrackingType,
    Uniformity,
};

pub use domain::{
    Actor, Batch, DailyMortality, DailyTrackingRecord, Feed, GrowthDetail, GrowthDetailInput, Role,
    WeeklyMortality,
};

pub use engine::{EfficiencyCalculator, GrowthEngine, NutritionalEfficiency, RecommendationEngine};

pub use api::{RecommendationApi, StatisticsApi, TrackingApi};

pub use app::AppState;

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "App Granja";
