//! [`Config`]-related definitions.

use std::{path::PathBuf, time};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Deserializer};
use service::{validation::PageLimits, DeletionPolicy};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: Server,

    /// Service configuration.
    #[serde(default)]
    pub service: Service,

    /// Storage configuration.
    #[serde(default)]
    pub storage: Storage,

    /// Log configuration.
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let config: Self = ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()?;
        config.service.pagination.check()?;
        Ok(config)
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8000)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Policy of deleting missing users.
    pub deletion: Deletion,

    /// Pagination configuration.
    pub pagination: Pagination,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            deletion,
            pagination:
                Pagination {
                    default_size,
                    max_size,
                },
        } = value;

        Self {
            deletion: deletion.into(),
            pagination: PageLimits {
                default_size,
                max_size,
            },
        }
    }
}

/// Policy of deleting missing users.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Deletion {
    /// Deleting a missing user responds with `404 Not Found`.
    #[default]
    Strict,

    /// Deleting a missing user succeeds.
    Idempotent,
}

impl From<Deletion> for DeletionPolicy {
    fn from(value: Deletion) -> Self {
        match value {
            Deletion::Strict => Self::Strict,
            Deletion::Idempotent => Self::Idempotent,
        }
    }
}

/// Pagination configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Pagination {
    /// Page size used when a request specifies none.
    #[default(PageLimits::default().default_size)]
    pub default_size: usize,

    /// Maximum page size a request may specify.
    #[default(PageLimits::default().max_size)]
    pub max_size: usize,
}

impl Pagination {
    /// Checks that [`Pagination::default_size`] is positive and doesn't exceed
    /// [`Pagination::max_size`].
    ///
    /// # Errors
    ///
    /// If any of the sizes is out of its range.
    pub fn check(&self) -> Result<(), ConfigError> {
        let Self {
            default_size,
            max_size,
        } = *self;
        if default_size == 0 {
            return Err(ConfigError::Message(
                "`service.pagination.default_size` must be positive".into(),
            ));
        }
        if default_size > max_size {
            return Err(ConfigError::Message(format!(
                "`service.pagination.default_size` ({default_size}) exceeds \
                 `service.pagination.max_size` ({max_size})",
            )));
        }
        Ok(())
    }
}

/// Storage configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Storage {
    /// Storage backend to keep users in.
    pub backend: Backend,

    /// Path to a JSON file with users to create at startup.
    pub seed: Option<PathBuf>,

    /// Postgres configuration.
    ///
    /// Used only by the [`Backend::Postgres`].
    pub postgres: Postgres,
}

/// Storage backend.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Backend {
    /// Users are kept in the process memory and lost on restart.
    #[default]
    Memory,

    /// Users are kept in Postgres.
    Postgres,
}

/// Postgres configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default(SecretString::from("postgres".to_owned()))]
    #[serde(deserialize_with = "secret_string")]
    pub password: SecretString,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Timeout of establishing a new connection.
    #[default(time::Duration::from_secs(5))]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: time::Duration,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
            connect_timeout,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password.expose_secret().to_owned()),
            dbname: Some(dbname),
            connect_timeout: Some(connect_timeout),
            ..Self::default()
        }
    }
}

/// Deserializes a [`SecretString`] not exposing it anywhere else.
fn secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use secrecy::ExposeSecret as _;
    use service::DeletionPolicy;

    use super::{Backend, Config, Pagination};

    #[test]
    fn defaults_without_file() {
        let config = Config::new("definitely/missing/config.toml").unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.backend, Backend::Memory);
        assert!(config.storage.seed.is_none());
        assert_eq!(
            config.storage.postgres.password.expose_secret(),
            "postgres",
        );

        let service = service::Config::from(config.service);
        assert_eq!(service.deletion, DeletionPolicy::Strict);
        assert_eq!(service.pagination.default_size, 50);
        assert_eq!(service.pagination.max_size, 100);
    }

    #[test]
    fn accepts_default_size_within_max() {
        assert!(Pagination::default().check().is_ok());
        for (default_size, max_size) in [(1, 1), (10, 100), (100, 100)] {
            let pagination = Pagination {
                default_size,
                max_size,
            };
            assert!(pagination.check().is_ok(), "{pagination:?}");
        }
    }

    #[test]
    fn rejects_zero_default_size() {
        let err = Pagination {
            default_size: 0,
            max_size: 100,
        }
        .check()
        .unwrap_err();

        assert!(err.to_string().contains("must be positive"), "{err}");
    }

    #[test]
    fn rejects_default_size_above_max() {
        let err = Pagination {
            default_size: 101,
            max_size: 100,
        }
        .check()
        .unwrap_err();

        assert!(err.to_string().contains("exceeds"), "{err}");
    }
}
