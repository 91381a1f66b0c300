// ==========================================
// App Granja - Domain layer
// ==========================================
// Responsibility: entities, value types, domain rules
// No data access, no engine logic
// ==========================================

pub mod access;
pub mod batch;
pub mod catalog;
pub mod farm;
pub mod feed;
pub mod mortality;
pub mod sale;
pub mod tracking;
pub mod types;
pub mod vaccine;

pub use access::{Actor, CapabilityPlan, CapabilityTable, Grant, Operation, Role};
pub use batch::Batch;
pub use catalog::{EntityDisplay, EntityKind, ENTITY_CATALOG};
pub use farm::{Breed, Farm, Shed};
pub use feed::Feed;
pub use mortality::{DailyMortality, WeeklyMortality};
pub use sale::{EggType, Sale, SaleItem};
pub use tracking::{DailyTrackingRecord, GrowthDetail, GrowthDetailInput, GrowthObservation};
pub use types::{
    BatchState, EggClass, FarmState, FeedStage, Period, RecommendationTier, Scope, ShedType,
    TrackingType, Uniformity,
};
pub use vaccine::Vaccine;
