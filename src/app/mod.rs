// ==========================================
// App Granja - Application layer
// ==========================================
// Wiring shared by the binaries
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
