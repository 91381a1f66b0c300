// ==========================================
// StatisticsApi integration tests
// ==========================================
// Trailing windows, sparse buckets, scopes, per-shed comparison
// ==========================================


use app_granja::domain::{DailyTrackingRecord, EggType, GrowthDetailInput, Sale, SaleItem, Vaccine};
use app_granja::{EggClass, Period, Scope, TrackingType, Uniformity};
use chrono::NaiveDate;
use test_helpers::*;

fn eggs(state: &app_granja::AppState, batch_id: &str, fecha: NaiveDate, huevos: i64, muertes: i64) {
    let mut r = DailyTrackingRecord::new(batch_id, fecha, TrackingType::Produccion);
    r.huevos_totales = huevos;
    r.mortalidad = muertes;
    state.tracking_api.registrar_seguimiento(&admin(), r).unwrap();
}

#[test]
fn test_weekly_production_is_sparse() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 1, 1));
    let hoy = d(2024, 3, 20);

    eggs(&state, &fx.batch.batch_id, d(2024, 1, 10), 999, 0); // outside 8 weeks
    eggs(&state, &fx.batch.batch_id, d(2024, 2, 20), 200, 0);
    eggs(&state, &fx.batch.batch_id, d(2024, 3, 11), 500, 3);
    eggs(&state, &fx.batch.batch_id, d(2024, 3, 13), 300, 0);

    let s = state
        .statistics_api
        .obtener_estadisticas_produccion_at(Period::Semana, &Scope::Todos, hoy)
        .unwrap();
    // weeks without records are not filled in
    assert_eq!(s.labels, vec!["Sem 08", "Sem 11"]);
    assert_eq!(s.datos, vec![200.0, 800.0]);

    let m = state
        .statistics_api
        .obtener_estadisticas_mortalidad_at(Period::Semana, &Scope::Todos, hoy)
        .unwrap();
    assert_eq!(m.labels, vec!["Sem 11"]);
    assert_eq!(m.datos, vec![3.0]);
}

#[test]
fn test_daily_and_monthly_windows() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 1, 1));
    let hoy = d(2024, 3, 20);

    eggs(&state, &fx.batch.batch_id, d(2024, 3, 13), 100, 0); // 7 days back, outside
    eggs(&state, &fx.batch.batch_id, d(2024, 3, 14), 110, 0);
    eggs(&state, &fx.batch.batch_id, d(2024, 3, 20), 120, 0);
    eggs(&state, &fx.batch.batch_id, d(2024, 2, 2), 50, 0);

    let s = state
        .statistics_api
        .obtener_estadisticas_produccion_at(Period::Dia, &Scope::Todos, hoy)
        .unwrap();
    assert_eq!(s.labels, vec!["14/03", "20/03"]);
    assert_eq!(s.datos, vec![110.0, 120.0]);

    let s = state
        .statistics_api
        .obtener_estadisticas_produccion_at(Period::Mes, &Scope::Todos, hoy)
        .unwrap();
    assert_eq!(s.labels, vec!["Feb 2024", "Mar 2024"]);
    assert_eq!(s.datos, vec![50.0, 330.0]);
}

#[test]
fn test_production_and_mortality_follow_scope() {
    let (_f, state) = create_test_state();
    let a = seed_growth_fixture(&state, "L-1", d(2024, 1, 1));
    let b = seed_growth_fixture(&state, "L-2", d(2024, 1, 1));
    let hoy = d(2024, 3, 20);

    eggs(&state, &a.batch.batch_id, d(2024, 3, 18), 400, 2);
    eggs(&state, &b.batch.batch_id, d(2024, 3, 18), 100, 5);
    eggs(&state, &b.batch.batch_id, d(2024, 3, 19), 150, 0);

    let api = &state.statistics_api;
    let todos = api
        .obtener_estadisticas_produccion_at(Period::Dia, &Scope::Todos, hoy)
        .unwrap();
    assert_eq!(todos.labels, vec!["18/03", "19/03"]);
    assert_eq!(todos.datos, vec![500.0, 150.0]);

    let lote_a = Scope::Lote(a.batch.batch_id.clone());
    let s = api.obtener_estadisticas_produccion_at(Period::Dia, &lote_a, hoy).unwrap();
    assert_eq!(s.labels, vec!["18/03"]);
    assert_eq!(s.datos, vec![400.0]);

    let m = api.obtener_estadisticas_mortalidad_at(Period::Dia, &lote_a, hoy).unwrap();
    assert_eq!(m.datos, vec![2.0]);

    let galpon_b = Scope::Galpon(b.shed.shed_id.clone());
    let m = api.obtener_estadisticas_mortalidad_at(Period::Dia, &galpon_b, hoy).unwrap();
    assert_eq!(m.labels, vec!["18/03"]);
    assert_eq!(m.datos, vec![5.0]);

    let vacio = Scope::Lote("otro".to_string());
    assert!(api
        .obtener_estadisticas_produccion_at(Period::Dia, &vacio, hoy)
        .unwrap()
        .labels
        .is_empty());
}

#[test]
fn test_egg_type_distribution_orders_by_units() {
    let (_f, state) = create_test_state();
    let venta = Sale::new("Cliente", 1_000.0, 0.0);
    state.sale_repo.insert(&venta).unwrap();

    let mut tipos = Vec::new();
    for clase in [EggClass::Aa, EggClass::A, EggClass::B] {
        let t = EggType::new(clase);
        state.sale_repo.insert_egg_type(&t).unwrap();
        tipos.push(t);
    }
    for (tipo, cantidad) in [(&tipos[0], 120), (&tipos[1], 300), (&tipos[0], 30), (&tipos[1], 20)] {
        let item = SaleItem::new(&venta.sale_id, &tipo.egg_type_id, cantidad, 400.0);
        state.sale_repo.insert_item(&item).unwrap();
    }

    let s = state.statistics_api.obtener_distribucion_tipos_huevo().unwrap();
    // classes without sales are left out
    assert_eq!(s.labels, vec![EggClass::A.display_name(), EggClass::Aa.display_name()]);
    assert_eq!(s.datos, vec![320.0, 150.0]);
}

#[test]
fn test_monthly_sales_revenue() {
    let (_f, state) = create_test_state();
    let hoy = d(2024, 3, 20);

    for (fecha, subtotal) in [(d(2024, 3, 1), 1_000.0), (d(2024, 3, 15), 500.0), (d(2023, 6, 1), 9_999.0)] {
        let mut s = Sale::new("Cliente", subtotal, 0.0);
        s.fecha_venta = fecha.and_hms_opt(12, 0, 0).unwrap();
        state.sale_repo.insert(&s).unwrap();
    }

    let s = state
        .statistics_api
        .obtener_estadisticas_ventas_at(Period::Mes, hoy)
        .unwrap();
    assert_eq!(s.labels, vec!["Mar 2024"]);
    assert_eq!(s.datos, vec![1_500.0]);
}

#[test]
fn test_growth_statistics_scope_and_shed_comparison() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    let hoy = d(2024, 3, 20);

    for (day, kg, gain, muertes) in [(18, 10.0, 50.0, 2), (19, 20.0, 50.0, 0)] {
        let mut r = DailyTrackingRecord::new(&fx.batch.batch_id, d(2024, 3, day), TrackingType::Engorde);
        r.peso_promedio_ave = 1.0 + day as f64 / 100.0;
        r.consumo_alimento_kg = kg;
        r.mortalidad = muertes;
        let r = state.tracking_api.registrar_seguimiento(&admin(), r).unwrap();
        state
            .tracking_api
            .guardar_detalle_engorde(&admin(), &r.tracking_id, &GrowthDetailInput::new(gain, Uniformity::Buena))
            .unwrap();
    }

    let g = state
        .statistics_api
        .obtener_estadisticas_engorde_at(Period::Dia, &Scope::Lote(fx.batch.batch_id.clone()), hoy)
        .unwrap();
    assert_eq!(g.labels, vec!["18/03", "19/03"]);
    assert_eq!(g.datos_eficiencia_energetica, vec![600.0, 1_200.0]);

    let g = state
        .statistics_api
        .obtener_estadisticas_engorde_at(Period::Dia, &Scope::Lote("otro".to_string()), hoy)
        .unwrap();
    assert!(g.labels.is_empty());

    let c = state
        .statistics_api
        .obtener_estadisticas_por_galpon_at(Period::Semana, hoy)
        .unwrap();
    assert_eq!(c.labels, vec!["Galpón 1"]);
    // both days fall in the same week: one bucket averaging 600 and 1200
    assert!((c.datos_eficiencia_energetica[0] - 900.0).abs() < 1e-6);
    assert_eq!(c.datos_mortalidad, vec![2.0]);
}

#[test]
fn test_inventory_and_dashboard() {
    let (_f, state) = create_test_state();
    let fx = seed_growth_fixture(&state, "L-1", d(2024, 3, 1));
    state
        .batch_repo
        .update_state(&fx.batch.batch_id, app_granja::BatchState::Finalizacion)
        .unwrap();
    seed_growth_fixture(&state, "L-2", d(2024, 3, 1));
    state
        .vaccine_repo
        .insert(&Vaccine::new("Nobilis ND", "Virus Newcastle", 120.0))
        .unwrap();

    let inv = state.statistics_api.obtener_resumen_inventario().unwrap();
    assert_eq!(inv.total_alimentos, 2);
    assert_eq!(inv.total_lotes, 2);
    assert_eq!(inv.lotes_activos, 1);
    assert_eq!(inv.total_vacunas, 1);

    let dash = state
        .statistics_api
        .obtener_estadisticas_dashboard_at(d(2024, 3, 20))
        .unwrap();
    assert_eq!(dash.inventario, inv);
    assert!(dash.produccion.is_empty());
    assert!(dash.engorde.labels.is_empty());
    assert!(dash.tipos_huevo.labels.is_empty());
}
