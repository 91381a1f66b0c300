// ==========================================
// TrackingApi integration tests
// ==========================================
// Uniqueness, edit permissions, growth detail derivation
// and batch recalculation against a real SQLite file
// ==========================================


use app_granja::api::{ApiError, RecalcSkipReason};
use app_granja::domain::{Actor, DailyTrackingRecord, Feed, GrowthDetailInput, Role};
use app_granja::{FeedStage, Scope, TrackingType, Uniformity};
use test_helpers::*;

fn growth_record(batch_id: &str, fecha: chrono::NaiveDate, peso: f64, kg: f64) -> DailyTrackingRecord {
    let mut r = DailyTrackingRecord::new(batch_id, fecha, TrackingType::Engorde);
    r.peso_promedio_ave = peso;
    r.consumo_alimento_kg = kg;
    r
}

#[test]
fn test_one_record_per_batch_and_date() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;

    let first = api
        .registrar_seguimiento(&operario("ana"), growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.2, 90.0))
        .unwrap();
    assert_eq!(first.registrado_por.as_deref(), Some("ana"));

    let err = api
        .registrar_seguimiento(&operario("luis"), growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.3, 95.0))
        .unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)), "got {:?}", err);

    // next day is fine
    api.registrar_seguimiento(&operario("luis"), growth_record(&fx.batch.batch_id, d(2024, 3, 11), 1.3, 95.0))
        .unwrap();
}

#[test]
fn test_unknown_batch_and_bad_measurements() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;

    let err = api
        .registrar_seguimiento(&admin(), growth_record("no-existe", d(2024, 3, 10), 1.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let mut r = DailyTrackingRecord::new(&fx.batch.batch_id, d(2024, 3, 10), TrackingType::Produccion);
    r.huevos_totales = 10;
    r.huevos_rotos = 8;
    r.huevos_sucios = 5;
    let err = api.registrar_seguimiento(&admin(), r).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_veterinarian_cannot_register_tracking() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));

    let vet = Actor::new("vet", Role::Veterinario);
    let err = state
        .tracking_api
        .registrar_seguimiento(&vet, growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied(_)));
}

#[test]
fn test_only_creator_or_supervisor_may_edit() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;

    let stored = api
        .registrar_seguimiento(&operario("ana"), growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.2, 90.0))
        .unwrap();

    let mut edit = stored.clone();
    edit.observaciones = "corregido".to_string();

    let err = api.actualizar_seguimiento(&operario("luis"), &edit).unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied(_)));

    let updated = api.actualizar_seguimiento(&operario("ana"), &edit).unwrap();
    assert_eq!(updated.observaciones, "corregido");
    assert_eq!(updated.registrado_por.as_deref(), Some("ana"));

    edit.observaciones = "revisado".to_string();
    let supervisor = Actor::new("marta", Role::Supervisor);
    let updated = api.actualizar_seguimiento(&supervisor, &edit).unwrap();
    assert_eq!(updated.observaciones, "revisado");
    // the creator is kept
    assert_eq!(updated.registrado_por.as_deref(), Some("ana"));

    // date is part of the record's identity
    let mut moved = updated.clone();
    moved.fecha_seguimiento = d(2024, 3, 12);
    let err = api.actualizar_seguimiento(&supervisor, &moved).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_growth_detail_rejected_on_production_record() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;

    let mut r = DailyTrackingRecord::new(&fx.batch.batch_id, d(2024, 3, 10), TrackingType::Produccion);
    r.huevos_totales = 500;
    let r = api.registrar_seguimiento(&admin(), r).unwrap();

    let err = api
        .guardar_detalle_engorde(&admin(), &r.tracking_id, &GrowthDetailInput::new(50.0, Uniformity::Buena))
        .unwrap_err();
    match err {
        ApiError::ValidationError(msg) => {
            assert_eq!(msg, "GrowthDetail requires a growth-type tracking record")
        }
        other => panic!("expected ValidationError, got {:?}", other),
    }
    assert!(api.obtener_detalle_engorde(&r.tracking_id).unwrap().is_none());
}

#[test]
fn test_growth_detail_derivation() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;

    api.registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.00, 90.0))
        .unwrap();
    let r = api
        .registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 11), 1.05, 10.0))
        .unwrap();

    let detail = api
        .guardar_detalle_engorde(&admin(), &r.tracking_id, &GrowthDetailInput::new(50.0, Uniformity::Buena))
        .unwrap();

    // 10 kg x 3000 kcal/kg, 10 kg x 20% x 10
    let energia = detail.consumo_energia.unwrap();
    let proteina = detail.consumo_proteina.unwrap();
    assert!((energia - 30_000.0).abs() < 1e-6);
    assert!((proteina - 2_000.0).abs() < 1e-6);
    assert!((detail.eficiencia_energetica.unwrap() - 600.0).abs() < 1e-6);
    assert!((detail.eficiencia_proteica.unwrap() - 40.0).abs() < 1e-6);
    assert!((detail.relacion_energia_proteina.unwrap() - 15.0).abs() < 1e-6);

    // FCR from the previous day: 10 kg / (0.05 kg x 1000 birds)
    let fcr = detail.conversion_alimenticia.unwrap();
    assert!((fcr - 0.2).abs() < 1e-6, "fcr = {}", fcr);

    let stored = api.obtener_detalle_engorde(&r.tracking_id).unwrap().unwrap();
    assert_eq!(stored.eficiencia_energetica, detail.eficiencia_energetica);
}

#[test]
fn test_growth_detail_input_validation() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;
    let r = api
        .registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.0, 10.0))
        .unwrap();

    let err = api
        .guardar_detalle_engorde(&admin(), &r.tracking_id, &GrowthDetailInput::new(-1.0, Uniformity::Buena))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let mut input = GrowthDetailInput::new(40.0, Uniformity::Buena);
    input.calidad_patas = Some(7);
    let err = api.guardar_detalle_engorde(&admin(), &r.tracking_id, &input).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_updating_tracking_rederives_growth_detail() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;

    let r = api
        .registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.0, 10.0))
        .unwrap();
    api.guardar_detalle_engorde(&admin(), &r.tracking_id, &GrowthDetailInput::new(50.0, Uniformity::Buena))
        .unwrap();

    let mut edit = r.clone();
    edit.consumo_alimento_kg = 5.0;
    api.actualizar_seguimiento(&admin(), &edit).unwrap();

    let detail = api.obtener_detalle_engorde(&r.tracking_id).unwrap().unwrap();
    assert!((detail.consumo_energia.unwrap() - 15_000.0).abs() < 1e-6);
    assert!((detail.eficiencia_energetica.unwrap() - 300.0).abs() < 1e-6);
}

#[test]
fn test_type_change_rejected_while_growth_detail_exists() {
    let (_f, path) = create_test_db().unwrap();
    let state = app_granja::AppState::new(path.clone()).unwrap();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;
    let hoy = d(2024, 3, 20);

    let mut records = Vec::new();
    for day in 10..13 {
        let r = api
            .registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, day), 1.0, 10.0))
            .unwrap();
        api.guardar_detalle_engorde(&admin(), &r.tracking_id, &GrowthDetailInput::new(50.0, Uniformity::Buena))
            .unwrap();
        records.push(r);
    }

    let mut edit = records[0].clone();
    edit.tipo_seguimiento = TrackingType::Produccion;
    let err = api.actualizar_seguimiento(&admin(), &edit).unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)), "{:?}", err);
    let stored = api.obtener_seguimiento(&records[0].tracking_id).unwrap();
    assert_eq!(stored.tipo_seguimiento, TrackingType::Engorde);

    // MIXTO still admits the detail
    edit.tipo_seguimiento = TrackingType::Mixto;
    api.actualizar_seguimiento(&admin(), &edit).unwrap();
    let analysis = state
        .recommendation_api
        .analizar_eficiencia_nutricional_at(&Scope::Todos, None, hoy)
        .unwrap();
    assert!(analysis.is_success());

    // a detail left on a production record by a direct write is ignored
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE daily_tracking SET tipo_seguimiento = 'PRODUCCION' WHERE tracking_id = ?1",
        [&records[0].tracking_id],
    )
    .unwrap();
    let analysis = state
        .recommendation_api
        .analizar_eficiencia_nutricional_at(&Scope::Todos, None, hoy)
        .unwrap();
    assert!(!analysis.is_success(), "only two growth records remain");
}

#[test]
fn test_editing_consumption_recomputes_fcr() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;

    api.registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.00, 90.0))
        .unwrap();
    let r = api
        .registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 11), 1.05, 100.0))
        .unwrap();
    let before = api
        .guardar_detalle_engorde(&admin(), &r.tracking_id, &GrowthDetailInput::new(50.0, Uniformity::Buena))
        .unwrap();
    // 100 kg / (0.05 kg x 1000 birds)
    assert!((before.conversion_alimenticia.unwrap() - 2.0).abs() < 1e-6);
    assert!(!before.conversion_manual);

    let mut edit = r.clone();
    edit.consumo_alimento_kg = 200.0;
    api.actualizar_seguimiento(&admin(), &edit).unwrap();

    let after = api.obtener_detalle_engorde(&r.tracking_id).unwrap().unwrap();
    let fcr = after.conversion_alimenticia.unwrap();
    assert!((fcr - 4.0).abs() < 1e-6, "fcr = {}", fcr);
    assert!((after.consumo_energia.unwrap() - 600_000.0).abs() < 1e-6);
    // the index divides by FCR, so it halves
    let ratio = before.indice_productividad.unwrap() / after.indice_productividad.unwrap();
    assert!((ratio - 2.0).abs() < 1e-6, "ratio = {}", ratio);
}

#[test]
fn test_manual_fcr_survives_record_edit() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;

    api.registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.00, 90.0))
        .unwrap();
    let r = api
        .registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 11), 1.05, 100.0))
        .unwrap();
    let input = GrowthDetailInput::new(50.0, Uniformity::Buena).with_conversion(1.7);
    api.guardar_detalle_engorde(&admin(), &r.tracking_id, &input).unwrap();

    let mut edit = r.clone();
    edit.consumo_alimento_kg = 200.0;
    api.actualizar_seguimiento(&admin(), &edit).unwrap();

    let after = api.obtener_detalle_engorde(&r.tracking_id).unwrap().unwrap();
    assert_eq!(after.conversion_alimenticia, Some(1.7));
    assert!(after.conversion_manual);
    assert!(!after.indice_manual);
}

#[test]
fn test_zero_energy_feed_leaves_efficiency_empty() {
    let (_f, state) = create_test_state();
    let feed = Feed::new("Sin energía", FeedStage::EngordeCrecimiento, 20.0, 0.0);
    let fx = seed_fixture_with_feed(&state, "L-1", d(2024, 3, 1), feed);
    let api = &state.tracking_api;

    let r = api
        .registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.0, 10.0))
        .unwrap();
    let detail = api
        .guardar_detalle_engorde(&admin(), &r.tracking_id, &GrowthDetailInput::new(50.0, Uniformity::Buena))
        .unwrap();

    assert_eq!(detail.consumo_energia, None);
    assert_eq!(detail.eficiencia_energetica, None);
    assert_eq!(detail.relacion_energia_proteina, None);
    // protein is still known
    assert!((detail.eficiencia_proteica.unwrap() - 40.0).abs() < 1e-6);
}

#[test]
fn test_recalcular_eficiencia_rejects_bad_window() {
    let (_f, state) = create_test_state();
    let hoy = d(2024, 3, 20);
    for dias in [-1, 100_000_000, i64::MAX] {
        let err = state
            .tracking_api
            .recalcular_eficiencia_at(Some(dias), hoy)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)), "dias = {}: {:?}", dias, err);
    }
}

#[test]
fn test_recalcular_eficiencia_reports_skips() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;

    let ok = api
        .registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.0, 10.0))
        .unwrap();
    api.guardar_detalle_engorde(&admin(), &ok.tracking_id, &GrowthDetailInput::new(50.0, Uniformity::Buena))
        .unwrap();

    let no_gain = api
        .registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 11), 1.0, 10.0))
        .unwrap();
    api.guardar_detalle_engorde(&admin(), &no_gain.tracking_id, &GrowthDetailInput::new(0.0, Uniformity::Buena))
        .unwrap();

    let no_feed = api
        .registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 12), 1.0, 0.0))
        .unwrap();
    api.guardar_detalle_engorde(&admin(), &no_feed.tracking_id, &GrowthDetailInput::new(30.0, Uniformity::Buena))
        .unwrap();

    let summary = api.recalcular_eficiencia_at(None, d(2024, 3, 20)).unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.actualizados, 1);
    assert!(summary.errores.is_empty());
    assert!(summary
        .omitidos
        .contains(&(no_gain.tracking_id.clone(), RecalcSkipReason::SinGanancia)));
    assert!(summary
        .omitidos
        .contains(&(no_feed.tracking_id.clone(), RecalcSkipReason::SinConsumo)));

    // window excludes the first two days
    let summary = api.recalcular_eficiencia_at(Some(8), d(2024, 3, 20)).unwrap();
    assert_eq!(summary.desde, Some(d(2024, 3, 12)));
    assert_eq!(summary.total, 1);
}

#[test]
fn test_recalcular_eficiencia_without_feed() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let api = &state.tracking_api;

    let r = api
        .registrar_seguimiento(&admin(), growth_record(&fx.batch.batch_id, d(2024, 3, 10), 1.0, 10.0))
        .unwrap();
    api.guardar_detalle_engorde(&admin(), &r.tracking_id, &GrowthDetailInput::new(50.0, Uniformity::Buena))
        .unwrap();
    state.batch_repo.update_feed(&fx.batch.batch_id, None).unwrap();

    let summary = api.recalcular_eficiencia_at(None, d(2024, 3, 20)).unwrap();
    assert_eq!(summary.actualizados, 0);
    assert_eq!(summary.omitidos, vec![(r.tracking_id, RecalcSkipReason::SinAlimento)]);
}
