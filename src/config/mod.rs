// ==========================================
// App Granja - Configuration layer
// ==========================================
// Storage: config_kv table, defaults in code
// ==========================================

pub mod config_manager;
pub mod recommendation_config;

pub use config_manager::{config_keys, ConfigManager};
pub use recommendation_config::{
    EfficiencyThresholds, RecommendationConfigReader, StaticRecommendationConfig,
};
