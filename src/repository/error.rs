// ==========================================
// App Granja - Repository error types
// ==========================================
// thiserror enums; rusqlite constraint failures get their own variants
// so the API layer can tell a duplicate (batch, date) from a broken FK.
// ==========================================

use thiserror::Error;

/// Repository layer error
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Database =====
    #[error("registro no encontrado: {entity} con id={id}")]
    NotFound { entity: String, id: String },

    #[error("no se pudo abrir la base de datos: {0}")]
    DatabaseConnectionError(String),

    #[error("no se pudo obtener el bloqueo de la conexión: {0}")]
    LockError(String),

    #[error("transacción fallida: {0}")]
    DatabaseTransactionError(String),

    #[error("consulta fallida: {0}")]
    DatabaseQueryError(String),

    #[error("restricción de unicidad violada: {0}")]
    UniqueConstraintViolation(String),

    #[error("restricción de clave foránea violada: {0}")]
    ForeignKeyViolation(String),

    // ===== Stored data =====
    #[error("valor inválido en {field}: {message}")]
    FieldValueError { field: String, message: String },

    #[error("error interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "desconocida".to_string(),
                id: "desconocido".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

// ==========================================
// Row decoding helpers
// ==========================================

/// Parse a stored `%Y-%m-%d` date inside a row mapper
pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a stored `%Y-%m-%d %H:%M:%S` timestamp inside a row mapper
pub(crate) fn parse_datetime(idx: usize, raw: &str) -> rusqlite::Result<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a stored enum string (`FromStr<Err = String>`) inside a row mapper
pub(crate) fn parse_enum<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|msg| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, msg)),
        )
    })
}

pub(crate) const DATE_FMT: &str = "%Y-%m-%d";
pub(crate) const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_failure_maps_to_dedicated_variant() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: RepositoryError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_parse_enum_reports_column() {
        use crate::domain::types::TrackingType;
        let err = parse_enum::<TrackingType>(3, "OTRO").unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(3, _, _)));
    }
}
