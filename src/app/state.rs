// ==========================================
// App Granja - Application state
// ==========================================
// Opens the database once, creates the schema and wires every
// repository and API around one shared connection.
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AccessApi, MortalityApi, RecommendationApi, StatisticsApi, TrackingApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::TrackingImporter;
use crate::repository::{
    AccessRepository, BatchRepository, DailyTrackingRepository, FarmRepository, FeedRepository,
    GrowthDetailRepository, ListingRepository, MortalityRepository, SaleRepository, VaccineRepository,
};

pub use crate::db::get_default_db_path;

pub struct AppState {
    pub db_path: String,

    pub tracking_api: Arc<TrackingApi>,
    pub mortality_api: Arc<MortalityApi>,
    pub statistics_api: Arc<StatisticsApi>,
    pub recommendation_api: Arc<RecommendationApi>,
    pub access_api: Arc<AccessApi>,
    pub importer: Arc<TrackingImporter>,

    pub config_manager: Arc<ConfigManager>,

    // direct repository access for seeding and listing
    pub farm_repo: Arc<FarmRepository>,
    pub batch_repo: Arc<BatchRepository>,
    pub feed_repo: Arc<FeedRepository>,
    pub sale_repo: Arc<SaleRepository>,
    pub vaccine_repo: Arc<VaccineRepository>,
    pub listing_repo: Arc<ListingRepository>,
}

impl AppState {
    /// Open (or create) the database at `db_path` and build every API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("inicializando AppState, base de datos: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("no se pudo abrir la base de datos: {}", e))?;
        init_schema(&conn).map_err(|e| format!("no se pudo crear el esquema: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ===== Repositories =====
        let farm_repo = Arc::new(FarmRepository::from_connection(conn.clone()));
        let feed_repo = Arc::new(FeedRepository::from_connection(conn.clone()));
        let batch_repo = Arc::new(BatchRepository::from_connection(conn.clone()));
        let tracking_repo = Arc::new(DailyTrackingRepository::from_connection(conn.clone()));
        let growth_repo = Arc::new(GrowthDetailRepository::from_connection(conn.clone()));
        let mortality_repo = Arc::new(MortalityRepository::from_connection(conn.clone()));
        let sale_repo = Arc::new(SaleRepository::from_connection(conn.clone()));
        let vaccine_repo = Arc::new(VaccineRepository::from_connection(conn.clone()));
        let access_repo = Arc::new(AccessRepository::from_connection(conn.clone()));
        let listing_repo = Arc::new(ListingRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("no se pudo crear ConfigManager: {}", e))?,
        );

        // ===== APIs =====
        let tracking_api = Arc::new(TrackingApi::new(
            tracking_repo.clone(),
            growth_repo.clone(),
            batch_repo.clone(),
            feed_repo.clone(),
            mortality_repo.clone(),
        ));
        let mortality_api = Arc::new(MortalityApi::new(mortality_repo, batch_repo.clone()));
        let statistics_api = Arc::new(StatisticsApi::new(
            tracking_repo,
            growth_repo.clone(),
            sale_repo.clone(),
            farm_repo.clone(),
            batch_repo.clone(),
            feed_repo.clone(),
            vaccine_repo.clone(),
        ));
        let recommendation_api = Arc::new(RecommendationApi::new(
            growth_repo,
            batch_repo.clone(),
            farm_repo.clone(),
            feed_repo.clone(),
            config_manager.clone(),
        ));
        let access_api = Arc::new(AccessApi::new(access_repo));
        let importer = Arc::new(TrackingImporter::new(tracking_api.clone(), batch_repo.clone()));

        tracing::info!("AppState listo");
        Ok(Self {
            db_path,
            tracking_api,
            mortality_api,
            statistics_api,
            recommendation_api,
            access_api,
            importer,
            config_manager,
            farm_repo,
            batch_repo,
            feed_repo,
            sale_repo,
            vaccine_repo,
            listing_repo,
        })
    }
}
