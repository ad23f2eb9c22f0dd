//! `movie-queue` entry point.
//!
//! # Responsibility
//! - Resolve storage and logging locations.
//! - Initialize the store before running any command.
//! - Map failures to a message on stderr and a non-zero exit status.

mod cli;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use directories::ProjectDirs;
use log::warn;
use movie_queue_core::{
    default_log_level, init_logging, CategoryStore, StoreConfig, LOG_DIR_NAME,
};

use crate::cli::{execute, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, log_dir) = resolve_locations(&cli, data_dir);
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, &log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let mut store = match CategoryStore::open_with_config(&config) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let status = match execute(&cli.command, &mut store, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    };

    if let Err(err) = store.close() {
        warn!("event=cli_exit module=cli status=error error={err}");
    }
    status
}

/// Picks the ledger config and log directory, calling `data_dir` only for
/// locations not given on the command line or in the environment.
fn resolve_locations(cli: &Cli, data_dir: impl Fn() -> PathBuf) -> (StoreConfig, PathBuf) {
    let config = match &cli.db {
        Some(path) => StoreConfig::new(path),
        None => StoreConfig::in_data_dir(&data_dir()),
    };
    let log_dir = match &cli.log_dir {
        Some(dir) => dir.clone(),
        None => data_dir().join(LOG_DIR_NAME),
    };
    (config, log_dir)
}

/// Platform data directory, created on demand; only consulted for settings
/// that were not given explicitly.
fn data_dir() -> PathBuf {
    let Some(dirs) = ProjectDirs::from("com", "movie-queue", "movie-queue") else {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    };
    let dir = dirs.data_dir().to_path_buf();
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("warning: could not create `{}`: {err}", dir.display());
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::{resolve_locations, Cli};
    use clap::Parser;
    use std::path::{Path, PathBuf};

    #[test]
    fn explicit_locations_skip_data_dir() {
        let cli = Cli::try_parse_from([
            "movie-queue",
            "--db",
            "/srv/mq/movies.db",
            "--log-dir",
            "/srv/mq/logs",
            "categories",
        ])
        .unwrap();

        let (config, log_dir) =
            resolve_locations(&cli, || panic!("data dir must not be resolved"));
        assert_eq!(config.db_path, Path::new("/srv/mq/movies.db"));
        assert_eq!(log_dir, Path::new("/srv/mq/logs"));
    }

    #[test]
    fn missing_locations_fall_back_to_data_dir() {
        let cli = Cli::try_parse_from(["movie-queue", "--db", "/srv/mq/movies.db", "categories"])
            .unwrap();

        let (_, log_dir) = resolve_locations(&cli, || PathBuf::from("/data"));
        assert_eq!(log_dir, Path::new("/data/logs"));
    }
}
