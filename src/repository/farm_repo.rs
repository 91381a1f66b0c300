// ==========================================
// App Granja - Farm / shed / breed repository
// ==========================================
// No business logic here: CRUD and lookups only
// ==========================================

use crate::domain::farm::{Breed, Farm, Shed};
use crate::domain::types::{BatchState, FarmState, ShedType};
use crate::repository::error::{parse_enum, RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const SHED_COLUMNS: &str =
    "s.shed_id, s.farm_id, s.numero_galpon, s.tipo_galpon, s.capacidad_aves, s.area_metros_cuadrados";

pub struct FarmRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FarmRepository {
    pub fn new(db_path: String) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(&db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Farm
    // ==========================================

    pub fn insert_farm(&self, farm: &Farm) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO farm (farm_id, codigo_granja, nombre, direccion, capacidad_total_aves, estado)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                farm.farm_id,
                farm.codigo_granja,
                farm.nombre,
                farm.direccion,
                farm.capacidad_total_aves,
                farm.estado.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn find_farm(&self, farm_id: &str) -> RepositoryResult<Option<Farm>> {
        let conn = self.get_conn()?;
        let farm = conn
            .query_row(
                r#"
                SELECT farm_id, codigo_granja, nombre, direccion, capacidad_total_aves, estado
                FROM farm WHERE farm_id = ?1
                "#,
                params![farm_id],
                |row| {
                    Ok(Farm {
                        farm_id: row.get(0)?,
                        codigo_granja: row.get(1)?,
                        nombre: row.get(2)?,
                        direccion: row.get(3)?,
                        capacidad_total_aves: row.get(4)?,
                        estado: parse_enum::<FarmState>(5, &row.get::<_, String>(5)?)?,
                    })
                },
            )
            .optional()?;
        Ok(farm)
    }

    // ==========================================
    // Shed
    // ==========================================

    pub fn insert_shed(&self, shed: &Shed) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shed (shed_id, farm_id, numero_galpon, tipo_galpon, capacidad_aves, area_metros_cuadrados)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                shed.shed_id,
                shed.farm_id,
                shed.numero_galpon,
                shed.tipo_galpon.as_str(),
                shed.capacidad_aves,
                shed.area_metros_cuadrados,
            ],
        )?;
        Ok(())
    }

    pub fn find_shed(&self, shed_id: &str) -> RepositoryResult<Option<Shed>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM shed s WHERE s.shed_id = ?1", SHED_COLUMNS);
        let shed = conn.query_row(&sql, params![shed_id], map_shed).optional()?;
        Ok(shed)
    }

    /// Sheds with at least one batch in `estado`, ordered by number
    pub fn list_sheds_with_batch_state(&self, estado: BatchState) -> RepositoryResult<Vec<Shed>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM shed s
            WHERE EXISTS (SELECT 1 FROM batch b WHERE b.shed_id = s.shed_id AND b.estado = ?1)
            ORDER BY s.numero_galpon
            "#,
            SHED_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let sheds = stmt
            .query_map(params![estado.as_str()], map_shed)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sheds)
    }

    // ==========================================
    // Breed
    // ==========================================

    pub fn insert_breed(&self, breed: &Breed) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO breed (breed_id, nombre) VALUES (?1, ?2)",
            params![breed.breed_id, breed.nombre],
        )?;
        Ok(())
    }

    pub fn find_breed(&self, breed_id: &str) -> RepositoryResult<Option<Breed>> {
        let conn = self.get_conn()?;
        let breed = conn
            .query_row(
                "SELECT breed_id, nombre FROM breed WHERE breed_id = ?1",
                params![breed_id],
                |row| {
                    Ok(Breed {
                        breed_id: row.get(0)?,
                        nombre: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(breed)
    }
}

fn map_shed(row: &Row<'_>) -> rusqlite::Result<Shed> {
    Ok(Shed {
        shed_id: row.get(0)?,
        farm_id: row.get(1)?,
        numero_galpon: row.get(2)?,
        tipo_galpon: parse_enum::<ShedType>(3, &row.get::<_, String>(3)?)?,
        capacidad_aves: row.get(4)?,
        area_metros_cuadrados: row.get(5)?,
    })
}
