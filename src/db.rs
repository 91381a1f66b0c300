// ==========================================
// App Granja - SQLite connection and schema
// ==========================================
// - Every connection gets the same PRAGMAs (foreign keys, busy_timeout)
// - Schema tables are created in entity-catalog order
// ==========================================

use crate::domain::catalog::{EntityKind, ENTITY_CATALOG};
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version written by `init_schema`
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// Apply the per-connection PRAGMAs
///
/// foreign_keys and busy_timeout must be set on every connection
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the shared configuration
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Read schema_version (None when the table does not exist)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Create every table (idempotent) and record the schema version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS role_capability (
            role TEXT NOT NULL,
            entity TEXT NOT NULL,
            operation TEXT NOT NULL,
            PRIMARY KEY (role, entity, operation)
        );
        "#,
    )?;

    for entry in ENTITY_CATALOG {
        conn.execute_batch(entity_ddl(entry.kind))?;
    }
    migrate_v2(conn)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    tracing::debug!(version = CURRENT_SCHEMA_VERSION, "schema inicializado");
    Ok(())
}

/// v2: growth_detail remembers whether FCR / index were typed by hand
fn migrate_v2(conn: &Connection) -> rusqlite::Result<()> {
    for column in ["conversion_manual", "indice_manual"] {
        if !has_column(conn, "growth_detail", column)? {
            conn.execute_batch(&format!(
                "ALTER TABLE growth_detail ADD COLUMN {} INTEGER NOT NULL DEFAULT 0;",
                column
            ))?;
            tracing::info!(column, "columna agregada a growth_detail");
        }
    }
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|n| n == column))
}

fn entity_ddl(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Granja => {
            r#"
            CREATE TABLE IF NOT EXISTS farm (
                farm_id TEXT PRIMARY KEY,
                codigo_granja TEXT NOT NULL UNIQUE,
                nombre TEXT NOT NULL,
                direccion TEXT NOT NULL DEFAULT '',
                capacidad_total_aves INTEGER NOT NULL DEFAULT 0,
                estado TEXT NOT NULL DEFAULT 'ACTIVA'
            );
            "#
        }
        EntityKind::Galpon => {
            r#"
            CREATE TABLE IF NOT EXISTS shed (
                shed_id TEXT PRIMARY KEY,
                farm_id TEXT NOT NULL REFERENCES farm(farm_id) ON DELETE CASCADE,
                numero_galpon TEXT NOT NULL,
                tipo_galpon TEXT NOT NULL DEFAULT 'POSTURA',
                capacidad_aves INTEGER NOT NULL,
                area_metros_cuadrados REAL,
                UNIQUE(farm_id, numero_galpon)
            );
            "#
        }
        EntityKind::Raza => {
            r#"
            CREATE TABLE IF NOT EXISTS breed (
                breed_id TEXT PRIMARY KEY,
                nombre TEXT NOT NULL
            );
            "#
        }
        EntityKind::Alimento => {
            r#"
            CREATE TABLE IF NOT EXISTS feed (
                feed_id TEXT PRIMARY KEY,
                codigo TEXT UNIQUE,
                nombre TEXT NOT NULL,
                etapa TEXT NOT NULL,
                contenido_proteina REAL,
                energia_metabolizable REAL,
                precio_kg REAL NOT NULL DEFAULT 0,
                activo INTEGER NOT NULL DEFAULT 1
            );
            "#
        }
        EntityKind::Lote => {
            r#"
            CREATE TABLE IF NOT EXISTS batch (
                batch_id TEXT PRIMARY KEY,
                shed_id TEXT NOT NULL REFERENCES shed(shed_id),
                breed_id TEXT NOT NULL REFERENCES breed(breed_id),
                feed_id TEXT REFERENCES feed(feed_id) ON DELETE SET NULL,
                codigo_lote TEXT NOT NULL UNIQUE,
                fecha_inicio TEXT NOT NULL,
                cantidad_inicial_aves INTEGER NOT NULL,
                edad_inicial_semanas INTEGER NOT NULL DEFAULT 0,
                estado TEXT NOT NULL DEFAULT 'INICIAL'
            );
            "#
        }
        EntityKind::SeguimientoDiario => {
            r#"
            CREATE TABLE IF NOT EXISTS daily_tracking (
                tracking_id TEXT PRIMARY KEY,
                batch_id TEXT NOT NULL REFERENCES batch(batch_id) ON DELETE CASCADE,
                fecha_seguimiento TEXT NOT NULL,
                registrado_por TEXT,
                tipo_seguimiento TEXT NOT NULL DEFAULT 'PRODUCCION',
                huevos_totales INTEGER NOT NULL DEFAULT 0,
                huevos_rotos INTEGER NOT NULL DEFAULT 0,
                huevos_sucios INTEGER NOT NULL DEFAULT 0,
                peso_promedio_ave REAL NOT NULL,
                consumo_alimento_kg REAL NOT NULL,
                consumo_agua_litros REAL,
                temperatura_min REAL,
                temperatura_max REAL,
                humedad REAL,
                mortalidad INTEGER NOT NULL DEFAULT 0,
                causa_mortalidad TEXT NOT NULL DEFAULT '',
                observaciones TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(batch_id, fecha_seguimiento)
            );
            CREATE INDEX IF NOT EXISTS idx_daily_tracking_fecha ON daily_tracking(fecha_seguimiento);
            "#
        }
        EntityKind::SeguimientoEngorde => {
            r#"
            CREATE TABLE IF NOT EXISTS growth_detail (
                tracking_id TEXT PRIMARY KEY REFERENCES daily_tracking(tracking_id) ON DELETE CASCADE,
                ganancia_diaria_peso REAL NOT NULL,
                conversion_alimenticia REAL,
                uniformidad TEXT NOT NULL,
                indice_productividad REAL,
                consumo_energia REAL,
                consumo_proteina REAL,
                eficiencia_energetica REAL,
                eficiencia_proteica REAL,
                relacion_energia_proteina REAL,
                longitud_corporal REAL,
                ancho_pechuga REAL,
                calidad_plumaje INTEGER,
                calidad_patas INTEGER,
                observaciones_engorde TEXT NOT NULL DEFAULT '',
                calculated_at TEXT NOT NULL,
                conversion_manual INTEGER NOT NULL DEFAULT 0,
                indice_manual INTEGER NOT NULL DEFAULT 0
            );
            "#
        }
        EntityKind::MortalidadDiaria => {
            r#"
            CREATE TABLE IF NOT EXISTS daily_mortality (
                mortality_id TEXT PRIMARY KEY,
                batch_id TEXT NOT NULL REFERENCES batch(batch_id) ON DELETE CASCADE,
                fecha TEXT NOT NULL,
                cantidad_muertes INTEGER NOT NULL,
                causa TEXT NOT NULL DEFAULT '',
                observaciones TEXT NOT NULL DEFAULT '',
                UNIQUE(batch_id, fecha)
            );
            "#
        }
        EntityKind::MortalidadSemanal => {
            r#"
            CREATE TABLE IF NOT EXISTS weekly_mortality (
                batch_id TEXT NOT NULL REFERENCES batch(batch_id) ON DELETE CASCADE,
                anio INTEGER NOT NULL,
                semana INTEGER NOT NULL,
                total_muertes INTEGER NOT NULL,
                porcentaje_mortalidad REAL NOT NULL,
                PRIMARY KEY (batch_id, anio, semana)
            );
            "#
        }
        EntityKind::Venta => {
            r#"
            CREATE TABLE IF NOT EXISTS sale (
                sale_id TEXT PRIMARY KEY,
                cliente TEXT NOT NULL,
                fecha_venta TEXT NOT NULL,
                subtotal REAL NOT NULL DEFAULT 0,
                impuesto REAL NOT NULL DEFAULT 0,
                total_venta REAL NOT NULL DEFAULT 0,
                vendedor TEXT,
                observaciones TEXT NOT NULL DEFAULT ''
            );
            "#
        }
        EntityKind::TipoHuevo => {
            r#"
            CREATE TABLE IF NOT EXISTS egg_type (
                egg_type_id TEXT PRIMARY KEY,
                clasificacion TEXT NOT NULL UNIQUE,
                descripcion TEXT NOT NULL DEFAULT ''
            );
            "#
        }
        EntityKind::DetalleVenta => {
            r#"
            CREATE TABLE IF NOT EXISTS sale_item (
                item_id TEXT PRIMARY KEY,
                sale_id TEXT NOT NULL REFERENCES sale(sale_id) ON DELETE CASCADE,
                egg_type_id TEXT NOT NULL REFERENCES egg_type(egg_type_id) ON DELETE RESTRICT,
                cantidad INTEGER NOT NULL CHECK (cantidad >= 0),
                precio_unitario REAL NOT NULL,
                subtotal_item REAL NOT NULL
            );
            "#
        }
        EntityKind::Vacuna => {
            r#"
            CREATE TABLE IF NOT EXISTS vaccine (
                vaccine_id TEXT PRIMARY KEY,
                nombre_comercial TEXT NOT NULL,
                principio_activo TEXT NOT NULL,
                lote_fabricante TEXT NOT NULL DEFAULT '',
                fecha_vencimiento TEXT,
                stock_ml REAL NOT NULL DEFAULT 0,
                precio_ml REAL NOT NULL,
                activo INTEGER NOT NULL DEFAULT 1
            );
            "#
        }
    }
}

/// Default database path: $APP_GRANJA_DB, else <data_dir>/app-granja/app_granja.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("APP_GRANJA_DB") {
        if !path.trim().is_empty() {
            return path;
        }
    }

    match dirs::data_dir() {
        Some(dir) => {
            let app_dir = dir.join("app-granja");
            if let Err(e) = std::fs::create_dir_all(&app_dir) {
                tracing::warn!("no se pudo crear el directorio de datos {}: {}", app_dir.display(), e);
                return "app_granja.db".to_string();
            }
            app_dir.join("app_granja.db").to_string_lossy().to_string()
        }
        None => "app_granja.db".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));

        for entry in ENTITY_CATALOG {
            let exists: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [entry.table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "tabla {} no creada", entry.table);
        }
    }

    #[test]
    fn test_v1_growth_table_gets_manual_flags() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE growth_detail (
                tracking_id TEXT PRIMARY KEY,
                ganancia_diaria_peso REAL NOT NULL,
                calculated_at TEXT NOT NULL
            );
            "#,
        )
        .unwrap();
        assert!(!has_column(&conn, "growth_detail", "conversion_manual").unwrap());

        init_schema(&conn).unwrap();
        assert!(has_column(&conn, "growth_detail", "conversion_manual").unwrap());
        assert!(has_column(&conn, "growth_detail", "indice_manual").unwrap());
    }
}
