// ==========================================
// App Granja - File parsers
// ==========================================
// CSV (.csv) and Excel (.xlsx) into header -> value rows.
// Headers are normalised (trimmed, lowercase, spaces -> '_').
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// One parsed data row: (1-based line in the file, header -> value)
pub type RawRow = (usize, HashMap<String, String>);

pub trait FileParser: Send + Sync {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

pub fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

fn check_file(path: &Path, allowed: &[&str]) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let ext = extension_of(path);
    // extension-less temp files are accepted as-is
    if !ext.is_empty() && !allowed.contains(&ext.as_str()) {
        return Err(ImportError::UnsupportedFormat(ext));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        check_file(file_path, &["csv"])?;

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row: HashMap<String, String> = headers
                .iter()
                .cloned()
                .zip(record.iter().map(|v| v.to_string()))
                .collect();

            if row.values().all(|v| v.is_empty()) {
                continue;
            }
            // header is line 1
            rows.push((idx + 2, row));
        }
        Ok(rows)
    }
}

// ==========================================
// Excel (first worksheet)
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        check_file(file_path, &["xlsx"])?;

        let mut workbook: Xlsx<_> = open_workbook(file_path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("el libro no tiene hojas".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut iter = range.rows();
        let headers: Vec<String> = iter
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("la hoja está vacía".to_string()))?
            .iter()
            .map(|cell| normalize_header(&cell.to_string()))
            .collect();

        let mut rows = Vec::new();
        for (idx, data_row) in iter.enumerate() {
            let row: HashMap<String, String> = headers
                .iter()
                .cloned()
                .zip(data_row.iter().map(|cell| cell.to_string().trim().to_string()))
                .collect();

            if row.values().all(|v| v.is_empty()) {
                continue;
            }
            rows.push((idx + 2, row));
        }
        Ok(rows)
    }
}

/// Picks the parser by file extension
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "csv" => CsvParser.parse_rows(path),
            "xlsx" => ExcelParser.parse_rows(path),
            other => {
                if !path.exists() {
                    return Err(ImportError::FileNotFound(path.display().to_string()));
                }
                Err(ImportError::UnsupportedFormat(other.to_string()))
            }
        }
    }
}
