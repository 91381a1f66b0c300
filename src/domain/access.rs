// ==========================================
// App Granja - Roles and capabilities
// ==========================================
// Declarative role -> capability table, built once.
// Persisted grants are diffed against it to produce a grant/revoke
// plan instead of re-running ad-hoc permission scripts.
// ==========================================

use crate::domain::catalog::EntityKind;
use crate::domain::tracking::DailyTrackingRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

// ==========================================
// Role
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Administrador,
    Supervisor,
    Operario,
    Veterinario,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Administrador,
        Role::Supervisor,
        Role::Operario,
        Role::Veterinario,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrador => "ADMINISTRADOR",
            Role::Supervisor => "SUPERVISOR",
            Role::Operario => "OPERARIO",
            Role::Veterinario => "VETERINARIO",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("rol desconocido: {}", s))
    }
}

// ==========================================
// Operation
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Ver,
    Crear,
    Editar,
    /// Edit rows registered by another user
    EditarAjeno,
    Eliminar,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Ver => "VER",
            Operation::Crear => "CREAR",
            Operation::Editar => "EDITAR",
            Operation::EditarAjeno => "EDITAR_AJENO",
            Operation::Eliminar => "ELIMINAR",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VER" => Ok(Operation::Ver),
            "CREAR" => Ok(Operation::Crear),
            "EDITAR" => Ok(Operation::Editar),
            "EDITAR_AJENO" => Ok(Operation::EditarAjeno),
            "ELIMINAR" => Ok(Operation::Eliminar),
            other => Err(format!("operación desconocida: {}", other)),
        }
    }
}

/// One (role, entity, operation) grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub role: Role,
    pub entity: EntityKind,
    pub operation: Operation,
}

// ==========================================
// Static table
// ==========================================
use EntityKind as E;
use Operation as O;

const READ: &[Operation] = &[O::Ver];
const WRITE: &[Operation] = &[O::Ver, O::Crear, O::Editar];
const FULL: &[Operation] = &[O::Ver, O::Crear, O::Editar, O::EditarAjeno, O::Eliminar];
const SUPERVISE: &[Operation] = &[O::Ver, O::Crear, O::Editar, O::EditarAjeno];

const ROLE_TABLE: &[(Role, &[(EntityKind, &[Operation])])] = &[
    (
        Role::Administrador,
        &[
            (E::Granja, FULL),
            (E::Galpon, FULL),
            (E::Raza, FULL),
            (E::Alimento, FULL),
            (E::Lote, FULL),
            (E::SeguimientoDiario, FULL),
            (E::SeguimientoEngorde, FULL),
            (E::MortalidadDiaria, FULL),
            (E::MortalidadSemanal, READ),
            (E::Venta, FULL),
            (E::TipoHuevo, FULL),
            (E::DetalleVenta, FULL),
            (E::Vacuna, FULL),
        ],
    ),
    (
        Role::Supervisor,
        &[
            (E::Granja, READ),
            (E::Galpon, READ),
            (E::Raza, READ),
            (E::Alimento, WRITE),
            (E::Lote, WRITE),
            (E::SeguimientoDiario, SUPERVISE),
            (E::SeguimientoEngorde, SUPERVISE),
            (E::MortalidadDiaria, SUPERVISE),
            (E::MortalidadSemanal, READ),
            (E::Venta, WRITE),
            (E::TipoHuevo, READ),
            (E::DetalleVenta, WRITE),
            (E::Vacuna, WRITE),
        ],
    ),
    (
        Role::Operario,
        &[
            (E::Galpon, READ),
            (E::Alimento, READ),
            (E::Lote, READ),
            (E::SeguimientoDiario, WRITE),
            (E::SeguimientoEngorde, WRITE),
            (E::MortalidadDiaria, WRITE),
            (E::MortalidadSemanal, READ),
            (E::Vacuna, READ),
        ],
    ),
    (
        Role::Veterinario,
        &[
            (E::Lote, READ),
            (E::SeguimientoDiario, READ),
            (E::SeguimientoEngorde, READ),
            (E::MortalidadDiaria, WRITE),
            (E::MortalidadSemanal, READ),
            (E::Vacuna, WRITE),
        ],
    ),
];

/// Role -> grants lookup built from the static table
pub struct CapabilityTable {
    grants: BTreeMap<Role, BTreeSet<Grant>>,
}

impl CapabilityTable {
    /// The built-in table (built on first use)
    pub fn standard() -> &'static CapabilityTable {
        static TABLE: OnceLock<CapabilityTable> = OnceLock::new();
        TABLE.get_or_init(|| CapabilityTable::from_rows(ROLE_TABLE))
    }

    fn from_rows(rows: &[(Role, &[(EntityKind, &[Operation])])]) -> Self {
        let mut grants: BTreeMap<Role, BTreeSet<Grant>> = BTreeMap::new();
        for (role, entities) in rows {
            let set = grants.entry(*role).or_default();
            for (entity, ops) in entities.iter() {
                for op in ops.iter() {
                    set.insert(Grant {
                        role: *role,
                        entity: *entity,
                        operation: *op,
                    });
                }
            }
        }
        Self { grants }
    }

    pub fn allows(&self, role: Role, entity: EntityKind, operation: Operation) -> bool {
        self.grants
            .get(&role)
            .map(|set| set.contains(&Grant { role, entity, operation }))
            .unwrap_or(false)
    }

    /// All grants, ordered
    pub fn all_grants(&self) -> BTreeSet<Grant> {
        self.grants.values().flatten().copied().collect()
    }

    /// Grants to add / remove so that `current` matches the table
    pub fn diff(&self, current: &BTreeSet<Grant>) -> CapabilityPlan {
        let desired = self.all_grants();
        CapabilityPlan {
            grant: desired.difference(current).copied().collect(),
            revoke: current.difference(&desired).copied().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityPlan {
    pub grant: Vec<Grant>,
    pub revoke: Vec<Grant>,
}

impl CapabilityPlan {
    pub fn is_empty(&self) -> bool {
        self.grant.is_empty() && self.revoke.is_empty()
    }
}

// ==========================================
// Actor
// ==========================================

/// The user performing a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn new(username: &str, role: Role) -> Self {
        Self {
            username: username.to_string(),
            role,
        }
    }

    pub fn can(&self, entity: EntityKind, operation: Operation) -> bool {
        CapabilityTable::standard().allows(self.role, entity, operation)
    }

    /// Creator of the record, or a role allowed to edit others' records
    pub fn can_edit_tracking(&self, record: &DailyTrackingRecord) -> bool {
        let own = record.registrado_por.as_deref() == Some(self.username.as_str());
        if own {
            return self.can(EntityKind::SeguimientoDiario, Operation::Editar);
        }
        self.can(EntityKind::SeguimientoDiario, Operation::EditarAjeno)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TrackingType;
    use chrono::NaiveDate;

    fn record_by(user: &str) -> DailyTrackingRecord {
        let mut r = DailyTrackingRecord::new(
            "b1",
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            TrackingType::Engorde,
        );
        r.registrado_por = Some(user.to_string());
        r
    }

    #[test]
    fn test_tracking_edit_rules() {
        let rec = record_by("ana");
        assert!(Actor::new("ana", Role::Operario).can_edit_tracking(&rec));
        assert!(!Actor::new("luis", Role::Operario).can_edit_tracking(&rec));
        assert!(Actor::new("sofia", Role::Supervisor).can_edit_tracking(&rec));
        assert!(Actor::new("root", Role::Administrador).can_edit_tracking(&rec));
        assert!(!Actor::new("vet", Role::Veterinario).can_edit_tracking(&rec));
    }

    #[test]
    fn test_diff_against_empty_grants_everything() {
        let table = CapabilityTable::standard();
        let plan = table.diff(&BTreeSet::new());
        assert_eq!(plan.grant.len(), table.all_grants().len());
        assert!(plan.revoke.is_empty());
    }

    #[test]
    fn test_diff_revokes_unknown_and_is_empty_when_synced() {
        let table = CapabilityTable::standard();
        let mut current = table.all_grants();
        assert!(table.diff(&current).is_empty());

        let stray = Grant {
            role: Role::Operario,
            entity: EntityKind::Venta,
            operation: Operation::Eliminar,
        };
        current.insert(stray);
        let plan = table.diff(&current);
        assert_eq!(plan.revoke, vec![stray]);
        assert!(plan.grant.is_empty());
    }
}
