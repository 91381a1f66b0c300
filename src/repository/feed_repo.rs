// ==========================================
// App Granja - Feed repository
// ==========================================

use crate::domain::feed::Feed;
use crate::domain::types::FeedStage;
use crate::repository::error::{parse_enum, RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const FEED_COLUMNS: &str =
    "feed_id, codigo, nombre, etapa, contenido_proteina, energia_metabolizable, precio_kg, activo";

pub struct FeedRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FeedRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, feed: &Feed) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO feed (feed_id, codigo, nombre, etapa, contenido_proteina,
                              energia_metabolizable, precio_kg, activo)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                feed.feed_id,
                feed.codigo,
                feed.nombre,
                feed.etapa.as_str(),
                feed.contenido_proteina,
                feed.energia_metabolizable,
                feed.precio_kg,
                feed.activo,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, feed_id: &str) -> RepositoryResult<Option<Feed>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM feed WHERE feed_id = ?1", FEED_COLUMNS);
        let feed = conn.query_row(&sql, params![feed_id], map_feed).optional()?;
        Ok(feed)
    }

    /// Other feeds of the same stage, by name
    pub fn list_same_stage(
        &self,
        etapa: FeedStage,
        exclude_feed_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<Feed>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM feed WHERE etapa = ?1 AND feed_id <> ?2 ORDER BY nombre LIMIT ?3",
            FEED_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let feeds = stmt
            .query_map(params![etapa.as_str(), exclude_feed_id, limit as i64], map_feed)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(feeds)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM feed", [], |row| row.get(0))?;
        Ok(n)
    }
}

fn map_feed(row: &Row<'_>) -> rusqlite::Result<Feed> {
    Ok(Feed {
        feed_id: row.get(0)?,
        codigo: row.get(1)?,
        nombre: row.get(2)?,
        etapa: parse_enum::<FeedStage>(3, &row.get::<_, String>(3)?)?,
        contenido_proteina: row.get(4)?,
        energia_metabolizable: row.get(5)?,
        precio_kg: row.get(6)?,
        activo: row.get(7)?,
    })
}
