// ==========================================
// App Granja - Field mapper
// ==========================================
// Normalised Spanish headers -> TrackingRow. Each field accepts a
// few aliases; empty cells read as absent.
// ==========================================

use crate::domain::types::{TrackingType, Uniformity};
use crate::importer::error::{ImportError, ImportResult};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// One imported tracking row, before batch resolution
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingRow {
    pub fila: usize,
    pub codigo_lote: String,
    pub fecha: NaiveDate,
    pub tipo: TrackingType,

    pub huevos_totales: i64,
    pub huevos_rotos: i64,
    pub huevos_sucios: i64,
    pub peso_promedio_ave: f64,
    pub consumo_alimento_kg: f64,
    pub consumo_agua_litros: Option<f64>,
    pub temperatura_min: Option<f64>,
    pub temperatura_max: Option<f64>,
    pub humedad: Option<f64>,
    pub mortalidad: i64,
    pub causa_mortalidad: String,
    pub observaciones: String,

    /// Present when the row carries a daily gain
    pub engorde: Option<GrowthColumns>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrowthColumns {
    pub ganancia_diaria_peso: f64,
    pub conversion_alimenticia: Option<f64>,
    pub uniformidad: Uniformity,
    pub longitud_corporal: Option<f64>,
    pub ancho_pechuga: Option<f64>,
    pub calidad_plumaje: Option<i64>,
    pub calidad_patas: Option<i64>,
}

pub const REQUIRED_COLUMNS: &[&str] = &["codigo_lote", "fecha"];

fn aliases(key: &str) -> &'static [&'static str] {
    match key {
        "codigo_lote" => &["codigo_lote", "código_lote", "lote"],
        "fecha" => &["fecha", "fecha_seguimiento"],
        "tipo" => &["tipo", "tipo_seguimiento"],
        "peso_promedio_ave" => &["peso_promedio_ave", "peso_promedio", "peso"],
        "consumo_alimento_kg" => &["consumo_alimento_kg", "consumo_alimento", "consumo"],
        "consumo_agua_litros" => &["consumo_agua_litros", "consumo_agua", "agua"],
        "mortalidad" => &["mortalidad", "muertes"],
        "causa_mortalidad" => &["causa_mortalidad", "causa"],
        "ganancia_diaria_peso" => &["ganancia_diaria_peso", "ganancia_diaria", "ganancia"],
        "conversion_alimenticia" => &["conversion_alimenticia", "conversión_alimenticia", "conversion", "fcr"],
        "calidad_plumaje" => &["calidad_plumaje", "plumaje"],
        "calidad_patas" => &["calidad_patas", "patas"],
        "huevos_totales" => &["huevos_totales", "huevos"],
        _ => &[],
    }
}

/// Required columns with no alias among the headers
pub fn missing_columns<'a>(headers: impl IntoIterator<Item = &'a String>) -> Vec<&'static str> {
    let headers: Vec<&String> = headers.into_iter().collect();
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|req| !aliases(req).iter().any(|a| headers.iter().any(|h| h.as_str() == *a)))
        .collect()
}

pub struct FieldMapper;

impl FieldMapper {
    pub fn map_tracking_row(&self, row: &HashMap<String, String>, fila: usize) -> ImportResult<TrackingRow> {
        let codigo_lote = self
            .get_string(row, "codigo_lote")
            .ok_or_else(|| ImportError::MissingField {
                row: fila,
                field: "codigo_lote".to_string(),
            })?;
        let fecha = self
            .parse_date(row, "fecha", fila)?
            .ok_or_else(|| ImportError::MissingField {
                row: fila,
                field: "fecha".to_string(),
            })?;

        let ganancia = self.parse_f64(row, "ganancia_diaria_peso", fila)?;
        let tipo = match self.get_string(row, "tipo") {
            Some(v) => v.parse::<TrackingType>().map_err(|message| ImportError::TypeConversionError {
                row: fila,
                field: "tipo".to_string(),
                message,
            })?,
            // growth columns without a type mean a growth record
            None if ganancia.is_some() => TrackingType::Engorde,
            None => TrackingType::Produccion,
        };

        let engorde = match ganancia {
            None => None,
            Some(ganancia_diaria_peso) => Some(GrowthColumns {
                ganancia_diaria_peso,
                conversion_alimenticia: self.parse_f64(row, "conversion_alimenticia", fila)?,
                uniformidad: self.parse_uniformity(row, fila)?,
                longitud_corporal: self.parse_f64(row, "longitud_corporal", fila)?,
                ancho_pechuga: self.parse_f64(row, "ancho_pechuga", fila)?,
                calidad_plumaje: self.parse_i64(row, "calidad_plumaje", fila)?,
                calidad_patas: self.parse_i64(row, "calidad_patas", fila)?,
            }),
        };

        Ok(TrackingRow {
            fila,
            codigo_lote,
            fecha,
            tipo,
            huevos_totales: self.parse_i64(row, "huevos_totales", fila)?.unwrap_or(0),
            huevos_rotos: self.parse_i64(row, "huevos_rotos", fila)?.unwrap_or(0),
            huevos_sucios: self.parse_i64(row, "huevos_sucios", fila)?.unwrap_or(0),
            peso_promedio_ave: self.parse_f64(row, "peso_promedio_ave", fila)?.unwrap_or(0.0),
            consumo_alimento_kg: self.parse_f64(row, "consumo_alimento_kg", fila)?.unwrap_or(0.0),
            consumo_agua_litros: self.parse_f64(row, "consumo_agua_litros", fila)?,
            temperatura_min: self.parse_f64(row, "temperatura_min", fila)?,
            temperatura_max: self.parse_f64(row, "temperatura_max", fila)?,
            humedad: self.parse_f64(row, "humedad", fila)?,
            mortalidad: self.parse_i64(row, "mortalidad", fila)?.unwrap_or(0),
            causa_mortalidad: self.get_string(row, "causa_mortalidad").unwrap_or_default(),
            observaciones: self.get_string(row, "observaciones").unwrap_or_default(),
            engorde,
        })
    }

    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        let fallback = [key];
        let names = aliases(key);
        let names: &[&str] = if names.is_empty() { &fallback } else { names };
        names
            .iter()
            .filter_map(|name| row.get(*name))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn parse_f64(&self, row: &HashMap<String, String>, key: &str, fila: usize) -> ImportResult<Option<f64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            // decimal comma is common in Spanish spreadsheets
            Some(v) => v
                .replace(',', ".")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: fila,
                    field: key.to_string(),
                    message: format!("no es un número: {}", v),
                }),
        }
    }

    fn parse_i64(&self, row: &HashMap<String, String>, key: &str, fila: usize) -> ImportResult<Option<i64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(v) => {
                if let Ok(n) = v.parse::<i64>() {
                    return Ok(Some(n));
                }
                // Excel hands integers over as "12.0"
                match v.parse::<f64>() {
                    Ok(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
                    _ => Err(ImportError::TypeConversionError {
                        row: fila,
                        field: key.to_string(),
                        message: format!("no es un entero: {}", v),
                    }),
                }
            }
        }
    }

    fn parse_date(&self, row: &HashMap<String, String>, key: &str, fila: usize) -> ImportResult<Option<NaiveDate>> {
        let Some(v) = self.get_string(row, key) else {
            return Ok(None);
        };
        for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%Y%m%d", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(d) = NaiveDate::parse_from_str(&v, fmt) {
                return Ok(Some(d));
            }
        }
        // Excel serial day number
        if let Ok(serial) = v.parse::<f64>() {
            if (1.0..200_000.0).contains(&serial) {
                if let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30) {
                    return Ok(Some(epoch + Duration::days(serial.trunc() as i64)));
                }
            }
        }
        Err(ImportError::DateFormatError {
            row: fila,
            field: key.to_string(),
            value: v,
        })
    }

    /// Category name or a percentage; defaults to BUENA when absent
    fn parse_uniformity(&self, row: &HashMap<String, String>, fila: usize) -> ImportResult<Uniformity> {
        let Some(v) = self.get_string(row, "uniformidad") else {
            return Ok(Uniformity::Buena);
        };
        if let Ok(u) = v.parse::<Uniformity>() {
            return Ok(u);
        }
        v.trim_end_matches('%')
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map(Uniformity::from_percentage)
            .map_err(|_| ImportError::TypeConversionError {
                row: fila,
                field: "uniformidad".to_string(),
                message: format!("uniformidad no reconocida: {}", v),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_growth_row_with_aliases() {
        let r = row(&[
            ("lote", "L-001"),
            ("fecha", "15/05/2024"),
            ("peso", "1,45"),
            ("consumo", "120.5"),
            ("ganancia", "55"),
            ("uniformidad", "84%"),
            ("mortalidad", "2.0"),
        ]);
        let t = FieldMapper.map_tracking_row(&r, 2).unwrap();
        assert_eq!(t.codigo_lote, "L-001");
        assert_eq!(t.fecha, NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());
        assert_eq!(t.tipo, TrackingType::Engorde);
        assert_eq!(t.peso_promedio_ave, 1.45);
        assert_eq!(t.mortalidad, 2);
        let g = t.engorde.unwrap();
        assert_eq!(g.ganancia_diaria_peso, 55.0);
        assert_eq!(g.uniformidad, Uniformity::Buena);
    }

    #[test]
    fn test_production_row_without_growth_columns() {
        let r = row(&[("codigo_lote", "L-002"), ("fecha", "2024-05-01"), ("huevos_totales", "950")]);
        let t = FieldMapper.map_tracking_row(&r, 3).unwrap();
        assert_eq!(t.tipo, TrackingType::Produccion);
        assert_eq!(t.huevos_totales, 950);
        assert!(t.engorde.is_none());
    }

    #[test]
    fn test_excel_serial_date() {
        let r = row(&[("codigo_lote", "L-1"), ("fecha", "45413")]);
        let t = FieldMapper.map_tracking_row(&r, 2).unwrap();
        assert_eq!(t.fecha, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_row_errors_carry_line_and_field() {
        let r = row(&[("codigo_lote", "L-1"), ("fecha", "ayer")]);
        let err = FieldMapper.map_tracking_row(&r, 7).unwrap_err();
        assert!(matches!(err, ImportError::DateFormatError { row: 7, .. }));

        let r = row(&[("fecha", "2024-05-01")]);
        let err = FieldMapper.map_tracking_row(&r, 8).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { row: 8, ref field } if field == "codigo_lote"));

        let r = row(&[("codigo_lote", "L-1"), ("fecha", "2024-05-01"), ("peso", "mucho")]);
        assert!(FieldMapper.map_tracking_row(&r, 9).is_err());
    }

    #[test]
    fn test_missing_required_columns() {
        let headers = vec!["lote".to_string(), "peso".to_string()];
        assert_eq!(missing_columns(&headers), vec!["fecha"]);
    }
}
