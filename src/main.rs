use log::{info, warn};
use mod_load_pipeline::compatibility::{default_update_url_for, CompatibilityDatabase};
use mod_load_pipeline::config::ResolverConfig;
use mod_load_pipeline::{logging, run_pipeline};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let root = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: mod-load-pipeline <mods-directory> [config.json] [compatibility.json]");
            return ExitCode::FAILURE;
        }
    };
    let config_path = args.next().map(PathBuf::from);
    let compat_db_path = args.next().map(PathBuf::from);

    let config = match config_path {
        Some(path) => ResolverConfig::load(&path).unwrap_or_else(|e| {
            eprintln!("failed to read config, using defaults: {}", e);
            ResolverConfig::default()
        }),
        None => ResolverConfig::default(),
    };

    if let Err(e) = logging::setup_logging(Path::new(&config.log_directory)) {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let compat_db = match compat_db_path {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(raw) => CompatibilityDatabase::from_json(&raw).unwrap_or_else(|e| {
                warn!("compatibility database '{}' is malformed: {}", path.display(), e);
                CompatibilityDatabase::new()
            }),
            Err(e) => {
                warn!("couldn't read compatibility database '{}': {}", path.display(), e);
                CompatibilityDatabase::new()
            }
        },
        None => CompatibilityDatabase::new(),
    };

    let result = run_pipeline(
        &root,
        &config.framework_api_version,
        &compat_db,
        &default_update_url_for,
        &config.compatibility_fallback_url,
    );

    let mods = match result {
        Ok(mods) => mods,
        Err(e) => {
            eprintln!("pipeline failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut any_failed = false;
    for m in &mods {
        if m.is_found() {
            info!("loaded '{}'", m.display_name);
        } else {
            any_failed = true;
            warn!(
                "failed to load '{}': {}",
                m.display_name,
                m.error().unwrap_or("unknown error")
            );
        }
    }

    if any_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
