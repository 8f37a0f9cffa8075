//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pocketnotes_core` linkage.
//! - Report collection sizes of the configured database.
//!
//! Usage: `pocketnotes_cli [config.json]`. Without a config file the
//! database comes from `POCKETNOTES_DB_PATH`; with neither, only the version
//! is printed. Opening a database creates and migrates it when missing.

use pocketnotes_core::config::ENV_DB_PATH;
use pocketnotes_core::{CoreConfig, PersistenceGateway, SqliteGateway};
use std::ffi::OsString;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("pocketnotes_core version={}", pocketnotes_core::core_version());

    let config_path = std::env::args_os().nth(1);
    if config_path.is_none() && std::env::var_os(ENV_DB_PATH).is_none() {
        return ExitCode::SUCCESS;
    }

    match run(config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pocketnotes_core error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<OsString>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => CoreConfig::from_json_file(path)?,
        None => CoreConfig::from_env()?,
    };
    config.start_logging()?;
    let gateway = SqliteGateway::open(&config.db_path)?;
    let groups = gateway.load_groups()?;
    let notes = gateway.load_notes()?;

    println!("pocketnotes_core db={}", config.db_path.display());
    println!("pocketnotes_core groups={}", groups.len());
    println!("pocketnotes_core notes={}", notes.len());
    for group in &groups {
        let count = notes.iter().filter(|note| note.group_id == group.id).count();
        println!("  [{}] {} notes={}", group.initials(), group.name, count);
    }
    Ok(())
}
