// ==========================================
// RecommendationApi integration tests
// ==========================================
// Tier classification over stored growth details,
// minimum-data rule, batch / shed wrappers
// ==========================================


use app_granja::api::{ApiError, NutritionalAnalysis};
use app_granja::domain::{DailyTrackingRecord, Feed, GrowthDetailInput};
use app_granja::{AppState, FeedStage, RecommendationTier, Scope, TrackingType, Uniformity};
use test_helpers::*;

const HOY: (i32, u32, u32) = (2024, 3, 20);

fn hoy() -> chrono::NaiveDate {
    d(HOY.0, HOY.1, HOY.2)
}

/// One growth record per day ending yesterday; gain 75 g so that
/// energy efficiency = kg x 3000 / 75
fn seed_days(state: &AppState, fx: &Fixture, kgs: &[f64]) {
    for (i, kg) in kgs.iter().enumerate() {
        let fecha = hoy() - chrono::Duration::days(1 + i as i64);
        let mut r = DailyTrackingRecord::new(&fx.batch.batch_id, fecha, TrackingType::Engorde);
        r.peso_promedio_ave = 1.5;
        r.consumo_alimento_kg = *kg;
        let r = state.tracking_api.registrar_seguimiento(&admin(), r).unwrap();
        state
            .tracking_api
            .guardar_detalle_engorde(&admin(), &r.tracking_id, &GrowthDetailInput::new(75.0, Uniformity::Buena))
            .unwrap();
    }
}

fn tier_of(report: &app_granja::api::AnalysisReport, idx: usize) -> RecommendationTier {
    report.recomendaciones[idx].tipo
}

#[test]
fn test_poor_energy_efficiency_is_alert() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    // 0.1 kg -> 300 kcal / 75 g = 4.0 kcal/g
    seed_days(&state, &fx, &[0.1, 0.1, 0.1]);

    let analysis = state
        .recommendation_api
        .analizar_eficiencia_nutricional_at(&Scope::Todos, None, hoy())
        .unwrap();
    let report = analysis.report().expect("success");

    assert!((report.estadisticas.avg_eficiencia_energetica - 4.0).abs() < 1e-9);
    assert_eq!(tier_of(report, 0), RecommendationTier::Alerta);
    // 20 g protein / 75 g = 0.27 g/g
    assert_eq!(tier_of(report, 1), RecommendationTier::Positivo);
    assert_eq!(report.mejor_registro.lote, "L-1");
    assert_eq!(report.mejor_registro.alimento, fx.feed.nombre);
}

#[test]
fn test_good_energy_efficiency_is_positive() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    // 0.05 kg -> 2.0 kcal/g
    seed_days(&state, &fx, &[0.05, 0.05, 0.05, 0.05]);

    let analysis = state
        .recommendation_api
        .analizar_eficiencia_nutricional_at(&Scope::Todos, None, hoy())
        .unwrap();
    let report = analysis.report().expect("success");
    assert!((report.estadisticas.avg_eficiencia_energetica - 2.0).abs() < 1e-9);
    assert_eq!(tier_of(report, 0), RecommendationTier::Positivo);
}

#[test]
fn test_borderline_energy_is_warning_and_best_record_is_lowest() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    // 2.8, 3.2, 3.6 kcal/g -> average 3.2
    seed_days(&state, &fx, &[0.07, 0.08, 0.09]);

    let analysis = state
        .recommendation_api
        .analizar_eficiencia_nutricional_at(&Scope::Todos, None, hoy())
        .unwrap();
    let report = analysis.report().expect("success");
    assert_eq!(tier_of(report, 0), RecommendationTier::Advertencia);
    assert!((report.estadisticas.min_eficiencia_energetica - 2.8).abs() < 1e-9);
    assert!((report.estadisticas.max_eficiencia_energetica - 3.6).abs() < 1e-9);
    assert!((report.mejor_registro.eficiencia_energetica.unwrap() - 2.8).abs() < 1e-9);
    assert_eq!(report.mejor_registro.fecha, hoy() - chrono::Duration::days(1));
}

#[test]
fn test_fewer_than_three_records_is_error() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    seed_days(&state, &fx, &[0.1, 0.1]);

    let analysis = state
        .recommendation_api
        .analizar_eficiencia_nutricional_at(&Scope::Todos, None, hoy())
        .unwrap();
    assert!(!analysis.is_success());
    assert!(analysis.report().is_none());

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains('3'));
}

#[test]
fn test_window_excludes_old_records() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 1, 1));
    seed_days(&state, &fx, &[0.1, 0.1, 0.1]);

    // records are 1..3 days old; a 2-day window keeps two
    let analysis = state
        .recommendation_api
        .analizar_eficiencia_nutricional_at(&Scope::Todos, Some(2), hoy())
        .unwrap();
    assert!(!analysis.is_success());
}

#[test]
fn test_out_of_range_window_is_invalid_input() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 1, 1));
    seed_days(&state, &fx, &[0.1, 0.1, 0.1]);

    for dias in [-1, 100_000_000] {
        let err = state
            .recommendation_api
            .analizar_eficiencia_nutricional_at(&Scope::Todos, Some(dias), hoy())
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)), "dias = {}: {:?}", dias, err);
    }
}

#[test]
fn test_similar_feeds_are_suggested() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    for i in 0..4 {
        let f = Feed::new(&format!("Alternativo {}", i), FeedStage::EngordeCrecimiento, 19.0, 3_050.0);
        state.feed_repo.insert(&f).unwrap();
    }
    let other_stage = Feed::new("Postura", FeedStage::PosturaFase1, 17.0, 2_800.0);
    state.feed_repo.insert(&other_stage).unwrap();
    seed_days(&state, &fx, &[0.1, 0.1, 0.1]);

    let analysis = state
        .recommendation_api
        .analizar_eficiencia_nutricional_at(&Scope::Todos, None, hoy())
        .unwrap();
    let report = analysis.report().expect("success");
    assert_eq!(report.alimentos_recomendados.len(), 3);
    assert!(report
        .alimentos_recomendados
        .iter()
        .all(|f| f.id != fx.feed.feed_id && f.id != other_stage.feed_id));
    assert!(report
        .recomendaciones
        .iter()
        .any(|r| r.tipo == RecommendationTier::Informacion && r.mensaje.contains(&fx.feed.nombre)));
}

#[test]
fn test_batch_and_shed_wrappers() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    seed_days(&state, &fx, &[0.1, 0.1, 0.1]);

    let analysis = state
        .recommendation_api
        .obtener_recomendaciones_lote_at(&fx.batch.batch_id, None, hoy())
        .unwrap();
    let report = analysis.report().expect("success");
    let lote = report.lote.as_ref().unwrap();
    assert_eq!(lote.codigo, "L-1");
    assert_eq!(lote.edad_semanas, 2);
    assert_eq!(lote.galpon, "1");
    assert_eq!(lote.alimento_actual, fx.feed.nombre);
    assert!(report.galpon.is_none());

    let analysis = state
        .recommendation_api
        .obtener_recomendaciones_galpon_at(&fx.shed.shed_id, None, hoy())
        .unwrap();
    let report = analysis.report().expect("success");
    let galpon = report.galpon.as_ref().unwrap();
    assert_eq!(galpon.numero, "1");
    assert_eq!(galpon.lotes_activos, 1);
    assert_eq!(galpon.capacidad, 2_000);
}

#[test]
fn test_unknown_batch_or_shed_is_error_result() {
    let (_f, state) = create_test_state();

    let analysis = state
        .recommendation_api
        .obtener_recomendaciones_lote_at("lote-x", None, hoy())
        .unwrap();
    match analysis {
        NutritionalAnalysis::Error { message } => assert!(message.contains("lote-x")),
        other => panic!("expected error, got {:?}", other),
    }

    let analysis = state
        .recommendation_api
        .obtener_recomendaciones_galpon_at("galpon-x", None, hoy())
        .unwrap();
    assert!(!analysis.is_success());
}

#[test]
fn test_thresholds_come_from_config_table() {
    use app_granja::config::config_keys;

    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    seed_days(&state, &fx, &[0.1, 0.1]);

    state
        .config_manager
        .set_global_config_value(config_keys::MIN_REGISTROS, "2")
        .unwrap();
    state
        .config_manager
        .set_global_config_value(config_keys::ENERGIA_ALERTA, "5.0")
        .unwrap();

    // 2 records are now enough, and 4.0 kcal/g is only a warning
    let analysis = state
        .recommendation_api
        .analizar_eficiencia_nutricional_at(&Scope::Todos, None, hoy())
        .unwrap();
    let report = analysis.report().expect("success");
    assert_eq!(tier_of(report, 0), RecommendationTier::Advertencia);

    // incoherent values fall back to the defaults
    state
        .config_manager
        .set_global_config_value(config_keys::ENERGIA_ADVERTENCIA, "9.0")
        .unwrap();
    let analysis = state
        .recommendation_api
        .analizar_eficiencia_nutricional_at(&Scope::Todos, None, hoy())
        .unwrap();
    assert!(!analysis.is_success());
}

#[test]
fn test_config_snapshot_lists_stored_thresholds() {
    use app_granja::config::config_keys;

    let (_f, state) = create_test_state();
    state
        .config_manager
        .set_global_config_value(config_keys::ENERGIA_ALERTA, "5.0")
        .unwrap();

    let snapshot = state.config_manager.get_config_snapshot().unwrap();
    let json: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
    assert!(json.is_object());
    assert_eq!(json[config_keys::ENERGIA_ALERTA], "5.0");
}
