// Seed a demo farm with three weeks of tracking data.
//
// Usage:
//   cargo run --bin seed_demo_data -- [db_path]
//
// An existing database is backed up and replaced. Values are fixed;
// only the dates move, ending yesterday, so the dashboards have data.

use anyhow::{anyhow, Result};
use chrono::{Duration, Local, NaiveDate};
use std::fs;
use std::path::Path;

use app_granja::app::{get_default_db_path, AppState};
use app_granja::domain::{
    Actor, Batch, Breed, DailyMortality, DailyTrackingRecord, EggType, Farm, Feed, GrowthDetailInput,
    Role, Sale, SaleItem, Shed, Vaccine,
};
use app_granja::{i18n, logging};
use app_granja::{BatchState, EggClass, FeedStage, ShedType, TrackingType, Uniformity};

const DEMO_DAYS: i64 = 21;
const BROILERS: i64 = 5_000;
const LAYERS: i64 = 3_000;

fn main() -> Result<()> {
    logging::init();
    i18n::set_locale(i18n::DEFAULT_LOCALE);

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(get_default_db_path);
    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone()).map_err(|e| anyhow!(e))?;
    let plan = state.access_api.sincronizar_permisos()?;
    eprintln!("permisos: {} concedidos", plan.grant.len());

    seed(&state, Local::now().date_naive() - Duration::days(1))?;

    let stats = state.statistics_api.obtener_resumen_inventario()?;
    println!(
        "{}: alimentos={} lotes={} activos={} vacunas={}",
        db_path, stats.total_alimentos, stats.total_lotes, stats.lotes_activos, stats.total_vacunas
    );
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }
    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;
    eprintln!("respaldo {} -> {}", db_path, backup_path);
    Ok(())
}

fn seed(state: &AppState, last_day: NaiveDate) -> Result<()> {
    let admin = Actor::new("demo", Role::Administrador);
    let first_day = last_day - Duration::days(DEMO_DAYS - 1);

    // ===== Farm, sheds, breeds =====
    let farm = Farm::new("GR-001", "Granja Demo", "Km 12 vía principal");
    state.farm_repo.insert_farm(&farm)?;
    let shed_broiler = Shed::new(&farm.farm_id, "1", ShedType::Cria, 6_000);
    let shed_layer = Shed::new(&farm.farm_id, "2", ShedType::Postura, 4_000);
    state.farm_repo.insert_shed(&shed_broiler)?;
    state.farm_repo.insert_shed(&shed_layer)?;
    let cobb = Breed::new("Cobb 500");
    let lohmann = Breed::new("Lohmann Brown");
    state.farm_repo.insert_breed(&cobb)?;
    state.farm_repo.insert_breed(&lohmann)?;

    // ===== Feeds =====
    let feeds = [
        Feed::new("Engorde Crecimiento Plus", FeedStage::EngordeCrecimiento, 20.0, 3_100.0),
        Feed::new("Engorde Crecimiento Base", FeedStage::EngordeCrecimiento, 19.0, 3_050.0),
        Feed::new("Engorde Crecimiento Eco", FeedStage::EngordeCrecimiento, 18.5, 3_000.0),
        Feed::new("Engorde Inicial", FeedStage::EngordeInicial, 22.0, 2_950.0),
        Feed::new("Postura Fase 1", FeedStage::PosturaFase1, 17.0, 2_800.0),
    ];
    for f in &feeds {
        state.feed_repo.insert(f)?;
    }

    // ===== Batches =====
    let mut broilers = Batch::new(&shed_broiler.shed_id, &cobb.breed_id, "L-ENG-001", first_day, BROILERS);
    broilers.feed_id = Some(feeds[0].feed_id.clone());
    broilers.estado = BatchState::Produccion;
    state.batch_repo.insert(&broilers)?;

    let mut layers = Batch::new(&shed_layer.shed_id, &lohmann.breed_id, "L-POS-001", first_day, LAYERS);
    layers.feed_id = Some(feeds[4].feed_id.clone());
    layers.edad_inicial_semanas = 24;
    layers.estado = BatchState::Produccion;
    state.batch_repo.insert(&layers)?;

    // ===== Daily tracking =====
    let mut alive = BROILERS;
    for day in 0..DEMO_DAYS {
        let fecha = first_day + Duration::days(day);
        let muertes = if day % 3 == 2 { 4 } else { 1 };

        // broilers: weight and growth
        let mut r = DailyTrackingRecord::new(&broilers.batch_id, fecha, TrackingType::Engorde);
        r.peso_promedio_ave = 0.18 + 0.055 * (day + 1) as f64;
        r.consumo_alimento_kg = alive as f64 * (0.045 + 0.004 * day as f64);
        r.consumo_agua_litros = Some(r.consumo_alimento_kg * 1.8);
        r.temperatura_min = Some(24.0);
        r.temperatura_max = Some(31.0);
        r.mortalidad = muertes;
        let r = state.tracking_api.registrar_seguimiento(&admin, r)?;

        let gain = 48.0 + day as f64 * 1.5;
        let uniformidad = if day < 7 { Uniformity::Regular } else { Uniformity::Buena };
        let mut input = GrowthDetailInput::new(gain, uniformidad);
        input.calidad_plumaje = Some(4);
        input.calidad_patas = Some(4);
        state
            .tracking_api
            .guardar_detalle_engorde(&admin, &r.tracking_id, &input)?;

        let m = DailyMortality::new(&broilers.batch_id, fecha, muertes, "natural");
        state.mortality_api.registrar_mortalidad_diaria(&admin, &m)?;
        alive -= muertes;

        // layers: eggs
        let mut e = DailyTrackingRecord::new(&layers.batch_id, fecha, TrackingType::Produccion);
        e.huevos_totales = 2_700 + (day % 5) * 20;
        e.huevos_rotos = 15 + day % 4;
        e.huevos_sucios = 20 + day % 3;
        e.peso_promedio_ave = 1.9;
        e.consumo_alimento_kg = LAYERS as f64 * 0.11;
        e.mortalidad = i64::from(day % 7 == 0);
        state.tracking_api.registrar_seguimiento(&admin, e)?;
    }

    // ===== Vaccines =====
    let mut newcastle = Vaccine::new("Nobilis ND Clone 30", "Virus Newcastle", 120.0);
    newcastle.stock_ml = 500.0;
    let mut gumboro = Vaccine::new("Bursine Plus", "Virus Gumboro", 95.0);
    gumboro.stock_ml = 250.0;
    state.vaccine_repo.insert(&newcastle)?;
    state.vaccine_repo.insert(&gumboro)?;

    // ===== Sales =====
    let classes = [EggClass::Aa, EggClass::A, EggClass::B];
    let mut egg_types = Vec::with_capacity(classes.len());
    for c in classes {
        let t = EggType::new(c);
        state.sale_repo.insert_egg_type(&t)?;
        egg_types.push(t);
    }
    for week in 0..(DEMO_DAYS / 7) {
        let mut s = Sale::new("Distribuidora El Campo", 1_200_000.0 + week as f64 * 50_000.0, 228_000.0);
        s.fecha_venta = (first_day + Duration::days(week * 7 + 6))
            .and_hms_opt(10, 0, 0)
            .ok_or_else(|| anyhow!("hora inválida"))?;
        s.total_venta = s.subtotal + s.impuesto;
        state.sale_repo.insert(&s)?;
        for (i, t) in egg_types.iter().enumerate() {
            let item = SaleItem::new(&s.sale_id, &t.egg_type_id, 1_800 - i as i64 * 500, 450.0 - i as f64 * 40.0);
            state.sale_repo.insert_item(&item)?;
        }
    }

    tracing::info!(desde = %first_day, hasta = %last_day, "datos de demostración creados");
    Ok(())
}
