// ==========================================
// App Granja - Configuration manager
// ==========================================
// Storage: config_kv (scope_id = 'global')
// Missing or unparsable values fall back to defaults.
// ==========================================

use crate::config::recommendation_config::{EfficiencyThresholds, RecommendationConfigReader};
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Re-applies the shared PRAGMAs to the given connection (idempotent)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let guard = conn.lock().map_err(|e| format!("no se pudo obtener el bloqueo: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("no se pudo obtener el bloqueo: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// Parsed value, or `default` when missing/invalid
    fn get_parsed_or<T: FromStr + Copy>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>> {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, "valor de configuración inválido, se usa el predeterminado");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// Upsert a global value
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("no se pudo obtener el bloqueo: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// All global values as a JSON object
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("no se pudo obtener el bloqueo: {}", e))?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (k, v) = row?;
            map.insert(k, v);
        }
        Ok(serde_json::to_string(&json!(map))?)
    }
}

impl RecommendationConfigReader for ConfigManager {
    fn get_efficiency_thresholds(&self) -> Result<EfficiencyThresholds, Box<dyn Error>> {
        let d = EfficiencyThresholds::default();
        let t = EfficiencyThresholds {
            energia_alerta: self.get_parsed_or(config_keys::ENERGIA_ALERTA, d.energia_alerta)?,
            energia_advertencia: self.get_parsed_or(config_keys::ENERGIA_ADVERTENCIA, d.energia_advertencia)?,
            proteina_alerta: self.get_parsed_or(config_keys::PROTEINA_ALERTA, d.proteina_alerta)?,
            proteina_advertencia: self.get_parsed_or(config_keys::PROTEINA_ADVERTENCIA, d.proteina_advertencia)?,
            relacion_alerta_min: self.get_parsed_or(config_keys::RELACION_ALERTA_MIN, d.relacion_alerta_min)?,
            relacion_alerta_max: self.get_parsed_or(config_keys::RELACION_ALERTA_MAX, d.relacion_alerta_max)?,
            relacion_optima_min: self.get_parsed_or(config_keys::RELACION_OPTIMA_MIN, d.relacion_optima_min)?,
            relacion_optima_max: self.get_parsed_or(config_keys::RELACION_OPTIMA_MAX, d.relacion_optima_max)?,
            min_registros: self.get_parsed_or(config_keys::MIN_REGISTROS, d.min_registros)?,
            dias_analisis: self.get_parsed_or(config_keys::DIAS_ANALISIS, d.dias_analisis)?,
        };

        if !t.is_consistent() {
            tracing::warn!(?t, "umbrales de recomendación incoherentes, se usan los predeterminados");
            return Ok(d);
        }
        Ok(t)
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    // energy efficiency (kcal/g)
    pub const ENERGIA_ALERTA: &str = "recomendacion_energia_alerta";
    pub const ENERGIA_ADVERTENCIA: &str = "recomendacion_energia_advertencia";

    // protein efficiency (g/g)
    pub const PROTEINA_ALERTA: &str = "recomendacion_proteina_alerta";
    pub const PROTEINA_ADVERTENCIA: &str = "recomendacion_proteina_advertencia";

    // energy:protein ratio
    pub const RELACION_ALERTA_MIN: &str = "recomendacion_relacion_alerta_min";
    pub const RELACION_ALERTA_MAX: &str = "recomendacion_relacion_alerta_max";
    pub const RELACION_OPTIMA_MIN: &str = "recomendacion_relacion_optima_min";
    pub const RELACION_OPTIMA_MAX: &str = "recomendacion_relacion_optima_max";

    pub const MIN_REGISTROS: &str = "recomendacion_min_registros";
    pub const DIAS_ANALISIS: &str = "recomendacion_dias_analisis";
}
