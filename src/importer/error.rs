// ==========================================
// App Granja - Import error types
// ==========================================
// File-level failures abort the import; row-level failures are
// collected into the import summary.
// ==========================================

use crate::i18n::t_with_args;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File =====
    #[error("{}", file_not_found(.0))]
    FileNotFound(String),

    #[error("{}", unsupported_format(.0))]
    UnsupportedFormat(String),

    #[error("no se pudo leer el archivo: {0}")]
    FileReadError(String),

    #[error("error al leer Excel: {0}")]
    ExcelParseError(String),

    #[error("error al leer CSV: {0}")]
    CsvParseError(String),

    #[error("faltan columnas obligatorias: {0}")]
    MissingColumns(String),

    // ===== Row mapping =====
    #[error("fila {row}: campo obligatorio vacío: {field}")]
    MissingField { row: usize, field: String },

    #[error("fila {row}, campo {field}: {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("fila {row}, campo {field}: fecha no reconocida '{value}' (se espera AAAA-MM-DD o DD/MM/AAAA)")]
    DateFormatError {
        row: usize,
        field: String,
        value: String,
    },

    #[error("fila {row}: lote desconocido '{codigo}'")]
    UnknownBatch { row: usize, codigo: String },

    #[error("error interno: {0}")]
    InternalError(String),
}

fn file_not_found(path: &str) -> String {
    t_with_args("importar.archivo_no_encontrado", &[("path", path)])
}

fn unsupported_format(ext: &str) -> String {
    t_with_args("importar.formato_no_soportado", &[("ext", ext)])
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
