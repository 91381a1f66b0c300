// ==========================================
// App Granja - Mortality API
// ==========================================
// Every daily insert/delete recomputes the weekly aggregate of the
// affected (batch, ISO week) in the same transaction.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::access::{Actor, Operation};
use crate::domain::batch::Batch;
use crate::domain::catalog::EntityKind;
use crate::domain::mortality::{DailyMortality, WeeklyMortality};
use crate::repository::{BatchRepository, MortalityRepository};
use std::sync::Arc;

pub struct MortalityApi {
    mortality_repo: Arc<MortalityRepository>,
    batch_repo: Arc<BatchRepository>,
}

impl MortalityApi {
    pub fn new(mortality_repo: Arc<MortalityRepository>, batch_repo: Arc<BatchRepository>) -> Self {
        Self {
            mortality_repo,
            batch_repo,
        }
    }

    /// Record deaths of one day and return the refreshed weekly aggregate
    pub fn registrar_mortalidad_diaria(
        &self,
        actor: &Actor,
        mortalidad: &DailyMortality,
    ) -> ApiResult<WeeklyMortality> {
        self.require(actor, Operation::Crear)?;
        if mortalidad.cantidad_muertes < 0 {
            return Err(ApiError::InvalidInput(format!(
                "cantidad_muertes no puede ser negativa: {}",
                mortalidad.cantidad_muertes
            )));
        }

        let batch = self.find_batch(&mortalidad.batch_id)?;
        let weekly = self
            .mortality_repo
            .insert_daily(mortalidad, batch.cantidad_inicial_aves)?;
        tracing::info!(
            batch_id = %mortalidad.batch_id,
            fecha = %mortalidad.fecha,
            muertes = mortalidad.cantidad_muertes,
            total_semana = weekly.total_muertes,
            "mortalidad diaria registrada"
        );
        Ok(weekly)
    }

    /// Delete a daily row; the weekly row stays (possibly with total 0)
    pub fn eliminar_mortalidad_diaria(&self, actor: &Actor, mortality_id: &str) -> ApiResult<WeeklyMortality> {
        self.require(actor, Operation::Eliminar)?;
        let mortalidad = self
            .mortality_repo
            .find_daily(mortality_id)?
            .ok_or_else(|| ApiError::NotFound(format!("MortalidadDiaria(id={})", mortality_id)))?;

        let batch = self.find_batch(&mortalidad.batch_id)?;
        let weekly = self
            .mortality_repo
            .delete_daily(&mortalidad, batch.cantidad_inicial_aves)?;
        tracing::info!(
            mortality_id = %mortality_id,
            total_semana = weekly.total_muertes,
            "mortalidad diaria eliminada"
        );
        Ok(weekly)
    }

    pub fn listar_mortalidad_semanal(&self, batch_id: &str) -> ApiResult<Vec<WeeklyMortality>> {
        Ok(self.mortality_repo.list_weekly(batch_id)?)
    }

    fn find_batch(&self, batch_id: &str) -> ApiResult<Batch> {
        self.batch_repo
            .find_by_id(batch_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Lote(id={})", batch_id)))
    }

    fn require(&self, actor: &Actor, operation: Operation) -> ApiResult<()> {
        if actor.can(EntityKind::MortalidadDiaria, operation) {
            return Ok(());
        }
        Err(ApiError::PermissionDenied(format!(
            "{} ({}) sin permiso {} sobre {}",
            actor.username,
            actor.role,
            operation,
            EntityKind::MortalidadDiaria
        )))
    }
}
