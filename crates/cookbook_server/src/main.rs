//! Cookbook GraphQL server entry point.
//!
//! # Responsibility
//! - Read configuration, start logging, open the store and serve the schema.
//! - With `COOKBOOK_PRINT_SDL` set, print the schema SDL and exit.

mod config;
mod http;

use config::{ConfigError, ServerConfig};
use cookbook_api::{build_schema, export_schema_sdl, Database, RegistryError};
use cookbook_core::db::DbError;
use cookbook_core::{init_logging, LoggingError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;
use std::time::Instant;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={err}");
            eprintln!("cookbook_server: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;

    if config.print_sdl {
        let schema = build_schema(Database::open_in_memory()?, Vec::new())?;
        println!("{}", export_schema_sdl(&schema));
        return Ok(());
    }

    init_logging(&config.log_level, &config.log_dir)?;
    info!(
        "event=server_start module=server status=start core_version={} api_version={}",
        cookbook_core::core_version(),
        cookbook_api::api_version()
    );

    let started_at = Instant::now();
    let database = Database::open(&config.db_path)?;
    let schema = build_schema(database, Vec::new())?;
    info!(
        "event=schema_ready module=server status=ok duration_ms={}",
        started_at.elapsed().as_millis()
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(ServerError::Io)?;
    info!(
        "event=server_listen module=server status=ok addr={}",
        config.listen_addr
    );
    axum::serve(listener, http::router(schema))
        .await
        .map_err(ServerError::Io)
}

#[derive(Debug)]
enum ServerError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Registry(RegistryError),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Logging(err) => write!(f, "logging init failed: {err}"),
            Self::Db(err) => write!(f, "database open failed: {err}"),
            Self::Registry(err) => write!(f, "schema composition failed: {err}"),
            Self::Io(err) => write!(f, "server i/o failed: {err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ServerError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for ServerError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RegistryError> for ServerError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}
