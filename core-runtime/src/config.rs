//! # Application Configuration
//!
//! Typed configuration for the song library service.
//!
//! ## Overview
//!
//! `AppConfig` is assembled either through [`AppConfigBuilder`] or from
//! `SL_*` environment variables via [`AppConfig::from_env`]. Both paths end
//! in the same fail-fast validation so a misconfigured process never gets as
//! far as opening a database connection.
//!
//! `from_env` also reads a `.env` file from the working directory when one
//! exists. Variables already set in the process environment win over the
//! file.
//!
//! ## Environment Variables
//!
//! | Variable                  | Required | Example                 |
//! |---------------------------|----------|-------------------------|
//! | `SL_ENV`                  | yes      | `dev` / `prod`          |
//! | `SL_SONG_DETAILS_API_URL` | yes      | `http://localhost:8081` |
//! | `SL_DB_HOST`              | yes      | `localhost`             |
//! | `SL_DB_PORT`              | yes      | `5432`                  |
//! | `SL_DB_USERNAME`          | yes      | `postgres`              |
//! | `SL_DB_PASSWORD`          | yes      |                         |
//! | `SL_DB_DATABASE`          | yes      | `songlibrary`           |
//! | `SL_DB_SSL_MODE`          | yes      | `disable`               |
//! | `SL_DB_MIGRATIONS_PATH`   | yes      | `./migrations`          |
//! | `SL_REQUEST_TIMEOUT`      | no       | `10s`                   |
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{AppConfig, DatabaseSettings, Environment};
//!
//! let config = AppConfig::builder()
//!     .environment(Environment::Dev)
//!     .song_details_api_url("http://localhost:8081")
//!     .database(DatabaseSettings::new("localhost", 5432, "postgres", "songlibrary"))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Deployment environment; selects the log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => Err(Error::Config(format!(
                "Invalid environment '{}': expected 'dev' or 'prod'",
                other
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dev => f.write_str("dev"),
            Self::Prod => f.write_str("prod"),
        }
    }
}

/// Postgres SSL negotiation mode, spelled as in libpq connection strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    #[default]
    Disable,
    Allow,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disable => "disable",
            Self::Allow => "allow",
            Self::Prefer => "prefer",
            Self::Require => "require",
            Self::VerifyCa => "verify-ca",
            Self::VerifyFull => "verify-full",
        }
    }
}

impl FromStr for SslMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "disable" => Ok(Self::Disable),
            "allow" => Ok(Self::Allow),
            "prefer" => Ok(Self::Prefer),
            "require" => Ok(Self::Require),
            "verify-ca" => Ok(Self::VerifyCa),
            "verify-full" => Ok(Self::VerifyFull),
            other => Err(Error::Config(format!("Invalid SSL mode '{}'", other))),
        }
    }
}

/// Connection parameters for the relational store.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: SslMode,
    /// Directory holding the SQL migrations applied at startup
    pub migrations_path: PathBuf,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Maximum time to wait for a pooled connection
    pub acquire_timeout: Duration,
}

impl DatabaseSettings {
    /// Create settings with an empty password, SSL disabled and the default
    /// `./migrations` directory.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: String::new(),
            database: database.into(),
            ssl_mode: SslMode::Disable,
            migrations_path: PathBuf::from("./migrations"),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_ssl_mode(mut self, ssl_mode: SslMode) -> Self {
        self.ssl_mode = ssl_mode;
        self
    }

    pub fn with_migrations_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.migrations_path = path.into();
        self
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Validates the connection settings
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("Database host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(Error::Config("Database port must be non-zero".to_string()));
        }

        if self.username.trim().is_empty() {
            return Err(Error::Config(
                "Database username cannot be empty".to_string(),
            ));
        }

        if self.database.trim().is_empty() {
            return Err(Error::Config("Database name cannot be empty".to_string()));
        }

        if self.migrations_path.as_os_str().is_empty() {
            return Err(Error::Config(
                "Migrations path cannot be empty".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(Error::Config(
                "Database pool needs at least one connection".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &redact_if_sensitive("password", &self.password))
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("migrations_path", &self.migrations_path)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

/// Top-level configuration for the song library service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub environment: Environment,
    /// Base URL of the external song detail lookup API
    pub song_details_api_url: String,
    pub database: DatabaseSettings,
    /// Upper bound for handling a single request, if any
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    /// Creates a new builder for constructing an `AppConfig`.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Loads the configuration from the process environment, falling back
    /// to `./.env` for variables the environment does not set.
    pub fn from_env() -> Result<Self> {
        Self::from_env_file(".env")
    }

    /// Same as [`AppConfig::from_env`] with an explicit dotenv file path.
    ///
    /// A missing file is not an error.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = read_env_file(path.as_ref())?;
        Self::from_layers(|key| std::env::var(key).ok(), &file)
    }

    fn from_layers<F>(env: F, file: &HashMap<String, String>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| env(key).or_else(|| file.get(key).cloned()))
    }

    /// Loads the configuration from an arbitrary key lookup.
    ///
    /// Used by [`AppConfig::from_env`]; tests pass a map-backed closure.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| Error::Config(format!("env variable {} not set", key)))
        };

        let port = required("SL_DB_PORT")?;
        let port = port
            .parse::<u16>()
            .map_err(|e| Error::Config(format!("Invalid SL_DB_PORT '{}': {}", port, e)))?;

        let database = DatabaseSettings::new(
            required("SL_DB_HOST")?,
            port,
            required("SL_DB_USERNAME")?,
            required("SL_DB_DATABASE")?,
        )
        .with_password(required("SL_DB_PASSWORD")?)
        .with_ssl_mode(required("SL_DB_SSL_MODE")?.parse()?)
        .with_migrations_path(required("SL_DB_MIGRATIONS_PATH")?);

        let mut builder = AppConfig::builder()
            .environment(required("SL_ENV")?.parse()?)
            .song_details_api_url(required("SL_SONG_DETAILS_API_URL")?)
            .database(database);

        if let Some(timeout) = lookup("SL_REQUEST_TIMEOUT") {
            builder = builder.request_timeout(parse_duration(&timeout)?);
        }

        builder.build()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        let url = self.song_details_api_url.trim();
        if url.is_empty() {
            return Err(Error::Config(
                "Song details API URL cannot be empty".to_string(),
            ));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Song details API URL must start with http:// or https://, got '{}'",
                url
            )));
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        self.database.validate()
    }
}

/// Builder for [`AppConfig`].
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    environment: Option<Environment>,
    song_details_api_url: Option<String>,
    database: Option<DatabaseSettings>,
    request_timeout: Option<Duration>,
}

impl AppConfigBuilder {
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn song_details_api_url(mut self, url: impl Into<String>) -> Self {
        self.song_details_api_url = Some(url.into());
        self
    }

    pub fn database(mut self, settings: DatabaseSettings) -> Self {
        self.database = Some(settings);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds the final `AppConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the API URL or database settings are
    /// missing, or if any value fails validation.
    pub fn build(self) -> Result<AppConfig> {
        let song_details_api_url = self.song_details_api_url.ok_or_else(|| {
            Error::Config(
                "Song details API URL is required. Use .song_details_api_url() to set it."
                    .to_string(),
            )
        })?;

        let database = self.database.ok_or_else(|| {
            Error::Config("Database settings are required. Use .database() to set them.".to_string())
        })?;

        let config = AppConfig {
            environment: self.environment.unwrap_or_default(),
            song_details_api_url: song_details_api_url.trim_end_matches('/').to_string(),
            database,
            request_timeout: self.request_timeout,
        };

        config.validate()?;

        Ok(config)
    }
}

/// Parses durations such as `250ms`, `10s`, `5m` or `1h`.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let invalid = || Error::Config(format!("Invalid duration '{}'", value));

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (amount, unit) = value.split_at(split);
    let amount: u64 = amount.parse().map_err(|_| invalid())?;

    match unit {
        "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => Ok(Duration::from_secs(amount * 60)),
        "h" => Ok(Duration::from_secs(amount * 3600)),
        _ => Err(invalid()),
    }
}

/// Reads `KEY=value` pairs from a dotenv file without touching the
/// process environment.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let invalid = |e: dotenvy::Error| {
        Error::Config(format!("Invalid env file {}: {}", path.display(), e))
    };

    match dotenvy::from_path_iter(path) {
        Ok(entries) => entries.map(|entry| entry.map_err(invalid)).collect(),
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(invalid(e)),
    }
}
