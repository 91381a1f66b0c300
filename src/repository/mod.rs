// ==========================================
// App Granja - Repository layer
// ==========================================
// Data access only, no business rules.
// All queries are parameterized; repositories share one
// Arc<Mutex<Connection>>.
// ==========================================

pub mod access_repo;
pub mod batch_repo;
pub mod error;
pub mod farm_repo;
pub mod feed_repo;
pub mod listing_repo;
pub mod mortality_repo;
pub mod sale_repo;
pub mod sql_builder;
pub mod tracking_repo;
pub mod vaccine_repo;

pub use access_repo::AccessRepository;
pub use batch_repo::BatchRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use farm_repo::FarmRepository;
pub use feed_repo::FeedRepository;
pub use listing_repo::ListingRepository;
pub use mortality_repo::MortalityRepository;
pub use sale_repo::SaleRepository;
pub use tracking_repo::{DailyTrackingRepository, GrowthDetailRepository};
pub use vaccine_repo::VaccineRepository;
