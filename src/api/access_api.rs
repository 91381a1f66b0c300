// ==========================================
// App Granja - Permission sync API
// ==========================================
// Compares the persisted grants with the static role table and
// optionally applies the resulting plan.
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::access::{CapabilityPlan, CapabilityTable};
use crate::repository::AccessRepository;
use std::sync::Arc;

pub struct AccessApi {
    access_repo: Arc<AccessRepository>,
}

impl AccessApi {
    pub fn new(access_repo: Arc<AccessRepository>) -> Self {
        Self { access_repo }
    }

    /// Grants/revocations needed to match the role table (no writes)
    pub fn planificar_permisos(&self) -> ApiResult<CapabilityPlan> {
        let current = self.access_repo.load_grants()?;
        Ok(CapabilityTable::standard().diff(&current))
    }

    /// Compute and apply the plan; returns what was applied
    pub fn sincronizar_permisos(&self) -> ApiResult<CapabilityPlan> {
        let plan = self.planificar_permisos()?;
        if plan.is_empty() {
            tracing::info!("permisos ya sincronizados");
            return Ok(plan);
        }
        self.access_repo.apply_plan(&plan)?;
        Ok(plan)
    }
}
