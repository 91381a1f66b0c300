// ==========================================
// App Granja - API error types
// ==========================================
// Turns repository/engine failures into caller-facing errors.
// Non-fatal conditions (no data, no feed) never reach this type.
// ==========================================

use crate::engine::growth::GrowthRuleError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ===== Business rules =====
    #[error("entrada inválida: {0}")]
    InvalidInput(String),

    #[error("recurso no encontrado: {0}")]
    NotFound(String),

    #[error("regla de negocio violada: {0}")]
    BusinessRuleViolation(String),

    #[error("permiso denegado: {0}")]
    PermissionDenied(String),

    #[error("{0}")]
    ValidationError(String),

    // ===== Data access =====
    #[error("error de base de datos: {0}")]
    DatabaseError(String),

    #[error("no se pudo conectar a la base de datos: {0}")]
    DatabaseConnectionError(String),

    #[error("transacción fallida: {0}")]
    DatabaseTransactionError(String),

    // ===== Import =====
    #[error("importación fallida: {0}")]
    ImportError(String),

    // ===== General =====
    #[error("error interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => ApiError::DatabaseTransactionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("bloqueo de conexión: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("registro duplicado: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("referencia inexistente: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("campo {}: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<GrowthRuleError> for ApiError {
    fn from(err: GrowthRuleError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TrackingType;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::NotFound {
            entity: "Lote".to_string(),
            id: "L-9".to_string(),
        }
        .into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Lote"));
                assert!(msg.contains("L-9"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }

        let api_err: ApiError =
            RepositoryError::UniqueConstraintViolation("UNIQUE constraint failed".into()).into();
        assert!(matches!(api_err, ApiError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_growth_rule_becomes_validation_error() {
        let api_err: ApiError = GrowthRuleError::NotGrowthRecord {
            tipo: TrackingType::Produccion,
        }
        .into();
        assert_eq!(
            api_err.to_string(),
            "GrowthDetail requires a growth-type tracking record"
        );
        assert!(matches!(api_err, ApiError::ValidationError(_)));
    }
}
