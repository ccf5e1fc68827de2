use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Configuration for busway, loaded from ~/.busway/config.toml
///
/// Every key is optional; missing keys fall back to the local development
/// database (`postgres@localhost:5432/busway`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuswayConfig {
    pub database: DatabaseConfig,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Full connection URL; wins over the discrete fields when set
    pub url: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "busway".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            url: None,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DatabaseConfig {
    /// Build sqlx connection options from the URL or the discrete fields.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return url.parse().map_err(ConfigError::InvalidUrl);
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        Ok(options)
    }

    /// Human-readable target for log lines (never includes credentials)
    pub fn describe(&self) -> String {
        match &self.url {
            Some(_) => "database URL".to_string(),
            None => format!("{}@{}:{}/{}", self.user, self.host, self.port, self.name),
        }
    }
}

impl BuswayConfig {
    /// Load the config file, then apply environment overrides.
    ///
    /// With `explicit = None` the default path is used and a missing file
    /// just means defaults. An explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path(), false),
        };

        let mut config = if path.exists() {
            let config = Self::from_file(&path)?;
            info!("Loaded configuration from {}", path.display());
            config
        } else if required {
            return Err(ConfigError::NotFound { path });
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config directory: ~/.busway
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".busway")
    }

    /// Config file path: ~/.busway/config.toml
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Apply `BUSWAY_DB_*` and `DATABASE_URL` overrides.
    ///
    /// Takes the lookup as a closure so tests don't have to mutate the
    /// process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = &mut self.database;

        if let Some(host) = lookup("BUSWAY_DB_HOST") {
            db.host = host;
        }
        if let Some(port) = lookup("BUSWAY_DB_PORT") {
            db.port = port.trim().parse().map_err(|_| ConfigError::InvalidPort {
                value: port.clone(),
                origin: "BUSWAY_DB_PORT".to_string(),
            })?;
        }
        if let Some(name) = lookup("BUSWAY_DB_NAME") {
            db.name = name;
        }
        if let Some(user) = lookup("BUSWAY_DB_USER") {
            db.user = user;
        }
        if let Some(password) = lookup("BUSWAY_DB_PASSWORD") {
            db.password = password;
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            db.url = Some(url);
        }

        Ok(())
    }
}

/// Load environment variables from .env files
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.busway/.env
pub fn load_dotenv() {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded .env from current directory: {}", path.display());
        loaded_from.push(path);
    }

    let env_file = BuswayConfig::config_dir().join(".env");
    if env_file.exists() {
        // dotenvy doesn't overwrite existing vars
        match dotenvy::from_path(&env_file) {
            Ok(()) => {
                debug!("Loaded .env from {}", env_file.display());
                loaded_from.push(env_file);
            }
            Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
        }
    }

    if loaded_from.is_empty() {
        debug!("No .env files found (current dir or ~/.busway)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_point_at_local_database() {
        let config = BuswayConfig::default();
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.name, "busway");
        assert_eq!(config.database.describe(), "postgres@localhost:5432/busway");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nhost = \"db.internal\"\nuser = \"arthur\"").unwrap();

        let config = BuswayConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.user, "arthur");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.name, "busway");
    }

    #[test]
    fn invalid_toml_is_reported_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database\nhost = ").unwrap();

        let err = BuswayConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = BuswayConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = BuswayConfig::default();
        let vars = env(&[
            ("BUSWAY_DB_HOST", "10.0.0.5"),
            ("BUSWAY_DB_PORT", "6543"),
            ("BUSWAY_DB_PASSWORD", "secret"),
        ]);

        config.apply_env(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.database.host, "10.0.0.5");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.password, "secret");
        assert_eq!(config.database.user, "postgres");
    }

    #[test]
    fn bad_port_in_env_is_rejected() {
        let mut config = BuswayConfig::default();
        let vars = env(&[("BUSWAY_DB_PORT", "five")]);

        let err = config.apply_env(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
    }

    #[test]
    fn database_url_wins_over_fields() {
        let mut config = BuswayConfig::default();
        let vars = env(&[("DATABASE_URL", "postgres://u:p@remote:6000/other")]);
        config.apply_env(|k| vars.get(k).cloned()).unwrap();

        let options = config.database.connect_options().unwrap();
        assert_eq!(options.get_host(), "remote");
        assert_eq!(options.get_port(), 6000);
        assert_eq!(options.get_database(), Some("other"));
        assert_eq!(config.database.describe(), "database URL");
    }

    #[test]
    fn malformed_url_is_rejected() {
        let config = DatabaseConfig {
            url: Some("not a url".to_string()),
            ..DatabaseConfig::default()
        };
        assert!(matches!(
            config.connect_options(),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let config = DatabaseConfig {
            password: "hunter2".to_string(),
            url: Some("postgres://u:hunter2@h/db".to_string()),
            ..DatabaseConfig::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
