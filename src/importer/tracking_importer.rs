// ==========================================
// App Granja - Daily tracking importer
// ==========================================
// parse -> map -> resolve batch -> TrackingApi write path.
// A bad row is reported and skipped; the rest still import.
// ==========================================

use crate::api::TrackingApi;
use crate::domain::access::Actor;
use crate::domain::tracking::{DailyTrackingRecord, GrowthDetailInput};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{missing_columns, FieldMapper, TrackingRow};
use crate::importer::file_parser::UniversalFileParser;
use crate::repository::BatchRepository;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub fila: usize,
    pub mensaje: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub archivo: String,
    pub total_filas: usize,
    pub importadas: usize,
    pub con_engorde: usize,
    pub errores: Vec<RowError>,
}

impl ImportSummary {
    fn fail(&mut self, fila: usize, mensaje: String) {
        warn!(fila, %mensaje, "fila rechazada");
        self.errores.push(RowError { fila, mensaje });
    }
}

pub struct TrackingImporter {
    tracking_api: Arc<TrackingApi>,
    batch_repo: Arc<BatchRepository>,
    parser: UniversalFileParser,
    mapper: FieldMapper,
}

impl TrackingImporter {
    pub fn new(tracking_api: Arc<TrackingApi>, batch_repo: Arc<BatchRepository>) -> Self {
        Self {
            tracking_api,
            batch_repo,
            parser: UniversalFileParser,
            mapper: FieldMapper,
        }
    }

    /// Import every row of `file_path` on behalf of `actor`
    ///
    /// # Errors
    /// File-level problems only (missing file, bad format, missing
    /// required columns). Row problems land in `ImportSummary::errores`.
    #[instrument(skip(self, file_path, actor), fields(usuario = %actor.username))]
    pub fn importar<P: AsRef<Path>>(&self, file_path: P, actor: &Actor) -> ImportResult<ImportSummary> {
        let path = file_path.as_ref();
        let rows = self.parser.parse(path)?;
        info!(archivo = %path.display(), filas = rows.len(), "importando seguimientos");

        let headers: BTreeSet<&String> = rows.iter().flat_map(|(_, r)| r.keys()).collect();
        let missing = missing_columns(headers);
        if !rows.is_empty() && !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing.join(", ")));
        }

        let mut summary = ImportSummary {
            archivo: path.display().to_string(),
            total_filas: rows.len(),
            ..ImportSummary::default()
        };
        let mut batch_ids: HashMap<String, Option<String>> = HashMap::new();

        for (fila, raw) in rows {
            let row = match self.mapper.map_tracking_row(&raw, fila) {
                Ok(r) => r,
                Err(e) => {
                    summary.fail(fila, e.to_string());
                    continue;
                }
            };

            let batch_id = match self.resolve_batch(&mut batch_ids, &row.codigo_lote) {
                Ok(Some(id)) => id,
                Ok(None) => {
                    let e = ImportError::UnknownBatch {
                        row: fila,
                        codigo: row.codigo_lote.clone(),
                    };
                    summary.fail(fila, e.to_string());
                    continue;
                }
                Err(e) => {
                    summary.fail(fila, e);
                    continue;
                }
            };

            self.write_row(&row, &batch_id, actor, &mut summary);
        }

        info!(
            importadas = summary.importadas,
            con_engorde = summary.con_engorde,
            errores = summary.errores.len(),
            "importacion finalizada"
        );
        Ok(summary)
    }

    fn resolve_batch(
        &self,
        cache: &mut HashMap<String, Option<String>>,
        codigo: &str,
    ) -> Result<Option<String>, String> {
        if let Some(id) = cache.get(codigo) {
            return Ok(id.clone());
        }
        let id = self
            .batch_repo
            .find_by_code(codigo)
            .map_err(|e| e.to_string())?
            .map(|b| b.batch_id);
        debug!(codigo, encontrado = id.is_some(), "lote resuelto");
        cache.insert(codigo.to_string(), id.clone());
        Ok(id)
    }

    fn write_row(&self, row: &TrackingRow, batch_id: &str, actor: &Actor, summary: &mut ImportSummary) {
        let mut record = DailyTrackingRecord::new(batch_id, row.fecha, row.tipo);
        record.huevos_totales = row.huevos_totales;
        record.huevos_rotos = row.huevos_rotos;
        record.huevos_sucios = row.huevos_sucios;
        record.peso_promedio_ave = row.peso_promedio_ave;
        record.consumo_alimento_kg = row.consumo_alimento_kg;
        record.consumo_agua_litros = row.consumo_agua_litros;
        record.temperatura_min = row.temperatura_min;
        record.temperatura_max = row.temperatura_max;
        record.humedad = row.humedad;
        record.mortalidad = row.mortalidad;
        record.causa_mortalidad = row.causa_mortalidad.clone();
        record.observaciones = row.observaciones.clone();

        let record = match self.tracking_api.registrar_seguimiento(actor, record) {
            Ok(r) => r,
            Err(e) => {
                summary.fail(row.fila, e.to_string());
                return;
            }
        };
        summary.importadas += 1;

        let Some(g) = &row.engorde else {
            return;
        };
        let input = GrowthDetailInput {
            ganancia_diaria_peso: g.ganancia_diaria_peso,
            conversion_alimenticia: g.conversion_alimenticia,
            uniformidad: g.uniformidad,
            indice_productividad: None,
            longitud_corporal: g.longitud_corporal,
            ancho_pechuga: g.ancho_pechuga,
            calidad_plumaje: g.calidad_plumaje,
            calidad_patas: g.calidad_patas,
            observaciones_engorde: String::new(),
        };
        match self
            .tracking_api
            .guardar_detalle_engorde(actor, &record.tracking_id, &input)
        {
            Ok(_) => summary.con_engorde += 1,
            // the tracking row itself stays imported
            Err(e) => summary.fail(row.fila, format!("detalle de engorde rechazado: {}", e)),
        }
    }
}
