// ==========================================
// AccessApi integration tests
// ==========================================
// Role table diffed against the persisted grants
// ==========================================


use app_granja::domain::{CapabilityTable, EntityKind, Operation, Role};
use test_helpers::*;

#[test]
fn test_sync_is_idempotent() {
    let (_f, state) = create_test_state();
    let api = &state.access_api;

    let applied = api.sincronizar_permisos().unwrap();
    assert_eq!(applied.grant.len(), CapabilityTable::standard().all_grants().len());
    assert!(applied.revoke.is_empty());

    assert!(api.planificar_permisos().unwrap().is_empty());
    assert!(api.sincronizar_permisos().unwrap().is_empty());
}

#[test]
fn test_stray_grant_is_revoked() {
    let (_f, path) = create_test_db().unwrap();
    let state = app_granja::AppState::new(path.clone()).unwrap();
    state.access_api.sincronizar_permisos().unwrap();

    // grant outside the table, written behind the API's back
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO role_capability (role, entity, operation) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            Role::Veterinario.as_str(),
            EntityKind::Venta.as_str(),
            Operation::Eliminar.as_str()
        ],
    )
    .unwrap();

    let plan = state.access_api.planificar_permisos().unwrap();
    assert!(plan.grant.is_empty());
    assert_eq!(plan.revoke.len(), 1);
    assert_eq!(plan.revoke[0].role, Role::Veterinario);

    state.access_api.sincronizar_permisos().unwrap();
    assert!(state.access_api.planificar_permisos().unwrap().is_empty());
}
