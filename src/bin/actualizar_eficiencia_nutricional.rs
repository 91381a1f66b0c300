// Recompute the nutritional efficiency of stored growth details.
//
// Usage:
//   cargo run --bin actualizar_eficiencia_nutricional -- [db_path] [dias]
//
// Without `dias` every detail is recomputed. Records whose batch has no
// usable feed, or with no consumption or gain, are skipped and reported.

use anyhow::{anyhow, Context, Result};
use app_granja::app::{get_default_db_path, AppState};
use app_granja::{i18n, logging};

fn main() -> Result<()> {
    logging::init();
    i18n::set_locale(i18n::DEFAULT_LOCALE);

    let mut args = std::env::args().skip(1);
    let db_path = args
        .next()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(get_default_db_path);
    let dias = args
        .next()
        .map(|d| d.parse::<i64>().with_context(|| format!("días inválidos: {}", d)))
        .transpose()?;

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;
    let summary = state.tracking_api.recalcular_eficiencia(dias)?;

    println!(
        "procesados={} actualizados={} omitidos={} errores={}",
        summary.total,
        summary.actualizados,
        summary.omitidos.len(),
        summary.errores.len()
    );
    for (tracking_id, error) in &summary.errores {
        eprintln!("{}: {}", tracking_id, error);
    }
    Ok(())
}
