// ==========================================
// App Granja - command line entry point
// ==========================================
// Results are printed to stdout as JSON; logs go to stderr.
//
// Usage:
//   app-granja [--db PATH] [--lang es|en] <command> [args]
//
// Commands:
//   dashboard [periodo]
//   engorde [periodo] [--lote ID | --galpon ID]
//   produccion [periodo] [--lote ID | --galpon ID]
//   mortalidad [periodo] [--lote ID | --galpon ID]
//   huevos
//   recomendaciones (lote|galpon|todos) [ID] [dias]
//   importar FILE USUARIO [ROL]
//   listar ENTIDAD [limite]
//   permisos [--aplicar]
//   config
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use app_granja::app::{get_default_db_path, AppState};
use app_granja::domain::catalog::{EntityKind, ENTITY_CATALOG};
use app_granja::domain::{Actor, Role};
use app_granja::{i18n, logging, Period, Scope};
use serde::Serialize;

const DEFAULT_LIST_LIMIT: usize = 50;

fn main() {
    logging::init();
    if let Err(e) = run(std::env::args().skip(1).collect()) {
        tracing::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(mut args: Vec<String>) -> Result<()> {
    let db_path = take_option(&mut args, "--db")?.unwrap_or_else(get_default_db_path);
    let lang = take_option(&mut args, "--lang")?;
    i18n::set_locale(lang.as_deref().unwrap_or(i18n::DEFAULT_LOCALE));

    let Some(command) = (!args.is_empty()).then(|| args.remove(0)) else {
        print_usage();
        return Ok(());
    };

    tracing::debug!(db = %db_path, command = %command, version = app_granja::VERSION, "app-granja");
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    match command.as_str() {
        "dashboard" => {
            let hoy = chrono::Local::now().date_naive();
            let mut stats = state.statistics_api.obtener_estadisticas_dashboard_at(hoy)?;
            if let Some(p) = args.first() {
                // the period argument only changes the growth section
                let periodo = parse_period(p)?;
                stats.engorde = state
                    .statistics_api
                    .obtener_estadisticas_engorde_at(periodo, &Scope::Todos, hoy)?;
            }
            print_json(&stats)
        }
        "engorde" | "produccion" | "mortalidad" => {
            let (periodo, scope) = parse_series_args(&mut args)?;
            let api = &state.statistics_api;
            match command.as_str() {
                "engorde" => print_json(&api.obtener_estadisticas_engorde(periodo, &scope)?),
                "produccion" => print_json(&api.obtener_estadisticas_produccion(periodo, &scope)?),
                _ => print_json(&api.obtener_estadisticas_mortalidad(periodo, &scope)?),
            }
        }
        "huevos" => print_json(&state.statistics_api.obtener_distribucion_tipos_huevo()?),
        "recomendaciones" => {
            let target = args.first().map(String::as_str).unwrap_or("todos");
            let api = &state.recommendation_api;
            let analysis = match target {
                "lote" => {
                    let id = args.get(1).context("falta el ID del lote")?;
                    api.obtener_recomendaciones_lote(id, parse_days(args.get(2))?)?
                }
                "galpon" => {
                    let id = args.get(1).context("falta el ID del galpón")?;
                    api.obtener_recomendaciones_galpon(id, parse_days(args.get(2))?)?
                }
                "todos" => api.analizar_eficiencia_nutricional(&Scope::Todos, parse_days(args.get(1))?)?,
                other => bail!("destino desconocido '{}' (lote, galpon o todos)", other),
            };
            print_json(&analysis)
        }
        "importar" => {
            let file = args.first().context("falta el archivo a importar")?;
            let usuario = args.get(1).context("falta el usuario")?;
            let role = match args.get(2) {
                Some(r) => r.parse::<Role>().map_err(|e| anyhow!(e))?,
                None => Role::Operario,
            };
            let summary = state.importer.importar(file, &Actor::new(usuario, role))?;
            print_json(&summary)
        }
        "listar" => {
            let Some(name) = args.first() else {
                let names: Vec<_> = ENTITY_CATALOG
                    .iter()
                    .map(|e| (e.kind.as_str(), e.label_plural))
                    .collect();
                return print_json(&names);
            };
            let kind: EntityKind = name.parse().map_err(|e: String| anyhow!(e))?;
            let limit = match args.get(1) {
                Some(n) => n.parse().context("límite inválido")?,
                None => DEFAULT_LIST_LIMIT,
            };
            print_json(&state.listing_repo.list(kind, limit)?)
        }
        "permisos" => {
            let plan = if args.iter().any(|a| a == "--aplicar") {
                state.access_api.sincronizar_permisos()?
            } else {
                state.access_api.planificar_permisos()?
            };
            print_json(&plan)
        }
        "config" => {
            let snapshot = state
                .config_manager
                .get_config_snapshot()
                .map_err(|e| anyhow!(e.to_string()))?;
            println!("{}", snapshot);
            Ok(())
        }
        other => {
            print_usage();
            bail!("comando desconocido: {}", other)
        }
    }
}

/// Remove `--flag VALUE` from args and return VALUE
fn take_option(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        bail!("{} requiere un valor", flag);
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

fn parse_period(s: &str) -> Result<Period> {
    s.parse::<Period>().map_err(|e| anyhow!(e))
}

/// `[periodo] [--lote ID | --galpon ID]`
fn parse_series_args(args: &mut Vec<String>) -> Result<(Period, Scope)> {
    let lote = take_option(args, "--lote")?;
    let galpon = take_option(args, "--galpon")?;
    let periodo = match args.first() {
        Some(p) => parse_period(p)?,
        None => Period::default(),
    };
    Ok((periodo, Scope::from_options(lote.as_deref(), galpon.as_deref())))
}

fn parse_days(s: Option<&String>) -> Result<Option<i64>> {
    s.map(|d| d.parse::<i64>().with_context(|| format!("días inválidos: {}", d)))
        .transpose()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_usage() {
    eprintln!(
        "app-granja {}\n\
         uso: app-granja [--db RUTA] [--lang es|en] <comando>\n\
         \n\
         comandos:\n  \
           dashboard [dia|semana|mes]\n  \
           engorde [dia|semana|mes] [--lote ID | --galpon ID]\n  \
           produccion [dia|semana|mes] [--lote ID | --galpon ID]\n  \
           mortalidad [dia|semana|mes] [--lote ID | --galpon ID]\n  \
           huevos\n  \
           recomendaciones (lote|galpon) ID [dias]\n  \
           recomendaciones todos [dias]\n  \
           importar ARCHIVO USUARIO [ROL]\n  \
           listar [ENTIDAD] [limite]\n  \
           permisos [--aplicar]\n  \
           config",
        app_granja::VERSION
    );
}
