//! [`Config`]-related definitions.

use std::time;

use common::pagination::{self, InvalidLimits, Limits};
use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use http::header::{HeaderValue, InvalidHeaderValue};
use serde::Deserialize;
use service::infra::postgres;
use smart_default::SmartDefault;
use tower_http::cors::AllowOrigin;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: Server,

    /// Postgres configuration.
    #[serde(default)]
    pub postgres: Postgres,

    /// Pagination configuration.
    #[serde(default)]
    pub pagination: Pagination,

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
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// Time after which an unfinished request is abandoned.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub request_timeout: time::Duration,

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

impl Cors {
    /// Builds the [`AllowOrigin`] accepting all the configured
    /// [`Cors::origins`].
    ///
    /// A `*` among them allows any origin.
    ///
    /// # Errors
    ///
    /// If any of the [`Cors::origins`] is not a valid header value.
    pub fn allow_origin(&self) -> Result<AllowOrigin, InvalidHeaderValue> {
        if self.origins.iter().any(|o| o == "*") {
            return Ok(AllowOrigin::any());
        }
        self.origins
            .iter()
            .map(|o| HeaderValue::from_str(o))
            .collect::<Result<Vec<_>, _>>()
            .map(AllowOrigin::list)
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
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
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Maximum number of simultaneously open connections.
    #[default(16)]
    pub pool_size: usize,
}

impl From<Postgres> for postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
            pool_size,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            pool: Some(postgres::PoolConfig::new(pool_size)),
            ..Self::default()
        }
    }
}

/// Pagination configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Pagination {
    /// Page size used when none (or an invalid one) is requested.
    #[default(pagination::DEFAULT_PAGE_SIZE)]
    pub default_page_size: u32,

    /// Largest page size allowed to be requested.
    #[default(pagination::MAX_PAGE_SIZE)]
    pub max_page_size: u32,
}

impl TryFrom<Pagination> for service::Config {
    type Error = InvalidLimits;

    fn try_from(value: Pagination) -> Result<Self, Self::Error> {
        let Pagination {
            default_page_size,
            max_page_size,
        } = value;

        Ok(Self {
            pagination: Limits::new(default_page_size, max_page_size)?,
        })
    }
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
    use std::time;

    use axum::{body::Body, routing::get, Router};
    use common::pagination::Limits;
    use http::{header, Request};
    use tower::ServiceExt as _;
    use tower_http::cors::CorsLayer;

    use super::{Config, Cors, Pagination};

    /// Returns the `Access-Control-Allow-Origin` granted to the `origin` by
    /// the provided [`Cors`].
    async fn allowed(cors: &Cors, origin: &str) -> Option<String> {
        let app = Router::new()
            .route("/", get(|| async {}))
            .layer(
                CorsLayer::new().allow_origin(cors.allow_origin().unwrap()),
            );
        let req = Request::get("/")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();

        app.oneshot(req)
            .await
            .unwrap()
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_owned())
    }

    #[test]
    fn defaults_missing_sections() {
        let conf = Config::new("definitely-missing-config-file").unwrap();

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.request_timeout, time::Duration::from_secs(30));
        assert_eq!(conf.postgres.pool_size, 16);
        assert_eq!(conf.pagination.default_page_size, 10);
        assert_eq!(conf.pagination.max_page_size, 100);
    }

    #[test]
    fn converts_pagination_into_limits() {
        let conf = service::Config::try_from(Pagination {
            default_page_size: 20,
            max_page_size: 50,
        })
        .unwrap();

        assert_eq!(conf.pagination, Limits::new(20, 50).unwrap());
    }

    #[test]
    fn rejects_inconsistent_pagination() {
        assert!(service::Config::try_from(Pagination {
            default_page_size: 0,
            max_page_size: 50,
        })
        .is_err());
        assert!(service::Config::try_from(Pagination {
            default_page_size: 60,
            max_page_size: 50,
        })
        .is_err());
    }

    #[tokio::test]
    async fn allows_every_configured_origin() {
        let cors = Cors {
            origins: vec![
                "https://a.example".into(),
                "https://b.example".into(),
            ],
        };

        for origin in ["https://a.example", "https://b.example"] {
            assert_eq!(allowed(&cors, origin).await.as_deref(), Some(origin));
        }
        assert_eq!(allowed(&cors, "https://c.example").await, None);
    }

    #[tokio::test]
    async fn allows_any_origin_with_wildcard() {
        let cors = Cors {
            origins: vec!["https://a.example".into(), "*".into()],
        };

        assert_eq!(
            allowed(&cors, "https://c.example").await.as_deref(),
            Some("*"),
        );
    }

    #[test]
    fn rejects_invalid_origin() {
        let cors = Cors {
            origins: vec!["https://a.example\n".into()],
        };

        assert!(cors.allow_origin().is_err());
    }
}
