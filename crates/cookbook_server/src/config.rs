//! Server configuration read from `COOKBOOK_*` environment variables.
//!
//! # Invariants
//! - Blank values count as unset and fall back to the defaults.
//! - `log_dir` is always absolute.

use cookbook_core::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_VAR: &str = "COOKBOOK_LISTEN_ADDR";
pub const DB_PATH_VAR: &str = "COOKBOOK_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "COOKBOOK_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "COOKBOOK_LOG_DIR";
pub const PRINT_SDL_VAR: &str = "COOKBOOK_PRINT_SDL";

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_DB_FILE_NAME: &str = "cookbook.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "cookbook-logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    /// Print the schema SDL and exit instead of serving.
    pub print_sdl: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let listen_addr = read(LISTEN_ADDR_VAR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidListenAddr(listen_addr.clone()))?;

        let db_path = read(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_dir = read(LOG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));
        if !log_dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(log_dir));
        }

        let print_sdl = match read(PRINT_SDL_VAR) {
            None => false,
            Some(value) => parse_flag(PRINT_SDL_VAR, &value)?,
        };

        Ok(Self {
            listen_addr,
            db_path,
            log_level: read(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir,
            print_sdl,
        })
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidListenAddr(String),
    RelativeLogDir(PathBuf),
    InvalidFlag { name: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidListenAddr(value) => {
                write!(f, "{LISTEN_ADDR_VAR} is not a socket address: {value}")
            }
            Self::RelativeLogDir(path) => {
                write!(f, "{LOG_DIR_VAR} must be absolute: {}", path.display())
            }
            Self::InvalidFlag { name, value } => {
                write!(f, "{name} must be 1, 0, true or false, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig, DB_PATH_VAR, LOG_DIR_VAR, PRINT_SDL_VAR};
    use cookbook_core::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:8000");
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("cookbook.sqlite3")
        );
        assert_eq!(config.log_level, default_log_level());
        assert!(config.log_dir.is_absolute());
        assert!(!config.print_sdl);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let log_dir = std::env::temp_dir().join("cookbook-test-logs");
        let log_dir = log_dir.to_string_lossy().to_string();
        let config = config_from(&[
            ("COOKBOOK_LISTEN_ADDR", "0.0.0.0:9000"),
            (DB_PATH_VAR, " /data/cookbook.db "),
            ("COOKBOOK_LOG_LEVEL", "warn"),
            (LOG_DIR_VAR, log_dir.as_str()),
            (PRINT_SDL_VAR, "TRUE"),
        ])
        .unwrap();

        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.db_path, PathBuf::from("/data/cookbook.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, PathBuf::from(log_dir));
        assert!(config.print_sdl);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[(DB_PATH_VAR, "   "), (PRINT_SDL_VAR, "")]).unwrap();
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("cookbook.sqlite3")
        );
        assert!(!config.print_sdl);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("COOKBOOK_LISTEN_ADDR", "localhost")]),
            Err(ConfigError::InvalidListenAddr(_))
        ));
        assert!(matches!(
            config_from(&[(LOG_DIR_VAR, "relative/logs")]),
            Err(ConfigError::RelativeLogDir(_))
        ));
        assert!(matches!(
            config_from(&[(PRINT_SDL_VAR, "yes")]),
            Err(ConfigError::InvalidFlag { .. })
        ));
    }
}
