use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "PHONESTOCK_";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub phonestock: String,
    pub r2d2: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const PHONESTOCK_LEVEL: &str = "info";
    const R2D2_LEVEL: &str = "warn";

    fn default() -> Self {
        LoggingConfig {
            phonestock: Self::PHONESTOCK_LEVEL.to_string(),
            r2d2: Self::R2D2_LEVEL.to_string(),
        }
    }

    /// Normalizes a level in place, falling back to `default` if it isn't one
    /// of the known levels.
    fn ensure_valid_level(name: &str, level: &mut String, default: &str) {
        let original = level.clone();
        *level = level.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&level.as_str()) {
            eprintln!(
                "Config error: {} log level of '{}' is invalid - using default of '{}'",
                name, original, default
            );
            *level = default.to_owned();
        }
    }

    fn ensure_valid(&mut self) {
        Self::ensure_valid_level("phonestock", &mut self.phonestock, Self::PHONESTOCK_LEVEL);
        Self::ensure_valid_level("r2d2", &mut self.r2d2, Self::R2D2_LEVEL);
    }

    /// Log specification in flexi_logger syntax, e.g. `phonestock=info, r2d2=warn`
    pub fn log_spec(&self) -> String {
        format!("phonestock={}, r2d2={}", self.phonestock, self.r2d2)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    const DEFAULT_HOST: &str = "127.0.0.1";
    const DEFAULT_PORT: u16 = 5000;

    fn default() -> Self {
        ServerConfig {
            host: Self::DEFAULT_HOST.to_owned(),
            port: Self::DEFAULT_PORT,
        }
    }

    fn ensure_valid(&mut self) {
        if self.host.trim().is_empty() {
            eprintln!(
                "Config error: server host is empty - using default of '{}'",
                Self::DEFAULT_HOST
            );
            self.host = Self::DEFAULT_HOST.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Directory holding the database file. Defaults to the app data directory.
    pub dir: Option<String>,
    pub pool_size: u32,
}

impl DatabaseConfig {
    const DEFAULT_POOL_SIZE: u32 = 4;
    const MAX_POOL_SIZE: u32 = 32;

    fn default() -> Self {
        DatabaseConfig {
            dir: None,
            pool_size: Self::DEFAULT_POOL_SIZE,
        }
    }

    fn ensure_valid(&mut self) {
        if self.pool_size == 0 || self.pool_size > Self::MAX_POOL_SIZE {
            let clamped = self.pool_size.clamp(1, Self::MAX_POOL_SIZE);
            eprintln!(
                "Config error: database pool_size of {} is out of range - using {}",
                self.pool_size, clamped
            );
            self.pool_size = clamped;
        }

        if matches!(self.dir.as_deref(), Some(d) if d.trim().is_empty()) {
            self.dir = None;
        }
    }

    pub fn resolve_dir(&self, project_dirs: &ProjectDirs) -> PathBuf {
        match &self.dir {
            Some(dir) => PathBuf::from(dir),
            None => project_dirs.data_local_dir().to_path_buf(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

pub fn get_config_path(project_dirs: &ProjectDirs) -> PathBuf {
    project_dirs.data_local_dir().join("config.toml")
}

impl Config {
    /// Loads the configuration from a TOML file located in the app's data directory,
    /// with `PHONESTOCK_`-prefixed environment variables layered on top.
    /// If the file is missing or fails to parse, defaults are used.
    /// Additionally, writes the default config to disk if no file exists.
    pub fn load_config(project_dirs: &ProjectDirs) -> Self {
        let config_path = get_config_path(project_dirs);

        if !config_path.exists() {
            Self::write_default(&config_path);
        }

        Self::load_from(&config_path)
    }

    fn write_default(config_path: &Path) {
        if let Some(parent) = config_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!(
                    "Failed to create configuration directory {}: {}",
                    parent.display(),
                    e
                );
            }
        }
        match toml::to_string_pretty(&Config::default()) {
            Ok(toml_string) => {
                if let Err(e) = fs::write(config_path, toml_string) {
                    eprintln!(
                        "Failed to write default config to {}: {}",
                        config_path.display(),
                        e
                    );
                }
            }
            Err(e) => eprintln!("Failed to serialize default config: {}", e),
        }
    }

    /// Defaults, then the TOML file (if it exists), then environment variables.
    /// Nested keys use a double underscore: `PHONESTOCK_SERVER__PORT=8080`.
    pub fn load_from(config_path: &Path) -> Self {
        let default_config = Config::default();

        let figment = Figment::from(Serialized::defaults(default_config.clone()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load config file {}: {}. Using default configuration.",
                config_path.display(),
                err
            );
            default_config
        });

        config.ensure_valid();

        config
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
        self.server.ensure_valid();
        self.database.ensure_valid();
    }
}
