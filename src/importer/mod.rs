// ==========================================
// App Granja - Import layer
// ==========================================
// Daily tracking rows from CSV / Excel
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod tracking_importer;

pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, GrowthColumns, TrackingRow};
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
pub use tracking_importer::{ImportSummary, RowError, TrackingImporter};
