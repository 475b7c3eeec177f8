#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_first, env_parse_or};

pub const DEFAULT_URL: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "storefront";

/// MongoDB connection settings.
///
/// Built manually or, with the `config` feature, from environment variables.
///
/// ```ignore
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "storefront")
///     .with_app_name("storefront_api");
/// ```
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    pub url: String,
    pub database: String,
    /// Reported to the server in connection handshakes
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    pub fn with_database(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Connection URL with any credentials masked, for logging.
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                format!("{}://***@{}", &self.url[..scheme_end], &self.url[at + 1..])
            }
            _ => self.url.clone(),
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            app_name: None,
            max_pool_size: 10,
            min_pool_size: 1,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 10,
        }
    }
}

/// Environment variables:
/// - `MONGODB_URI` (aliases `MONGODB_URL`, `MONGO_URL`), default `mongodb://localhost:27017`
/// - `DATABASE_NAME` (aliases `MONGODB_DATABASE`, `MONGO_DATABASE`), default `storefront`
/// - `MONGODB_APP_NAME` (optional)
/// - `MONGODB_MAX_POOL_SIZE` (default 10), `MONGODB_MIN_POOL_SIZE` (default 1)
/// - `MONGODB_CONNECT_TIMEOUT_SECS` (default 10)
/// - `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (default 10)
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let url = env_first(&["MONGODB_URI", "MONGODB_URL", "MONGO_URL"]).unwrap_or(defaults.url);
        let database = env_first(&["DATABASE_NAME", "MONGODB_DATABASE", "MONGO_DATABASE"])
            .unwrap_or(defaults.database);

        if url.trim().is_empty() {
            return Err(ConfigError::ParseError {
                key: "MONGODB_URI".to_string(),
                details: "connection string must not be empty".to_string(),
            });
        }

        Ok(Self {
            url,
            database,
            app_name: std::env::var("MONGODB_APP_NAME").ok(),
            max_pool_size: env_parse_or("MONGODB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            min_pool_size: env_parse_or("MONGODB_MIN_POOL_SIZE", defaults.min_pool_size)?,
            connect_timeout_secs: env_parse_or(
                "MONGODB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            server_selection_timeout_secs: env_parse_or(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                defaults.server_selection_timeout_secs,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_database_keeps_pool_defaults() {
        let config = MongoConfig::with_database("mongodb://db:27017", "shop");
        assert_eq!(config.url(), "mongodb://db:27017");
        assert_eq!(config.database(), "shop");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.min_pool_size, 1);
    }

    #[test]
    fn test_redacted_url_masks_credentials() {
        let config = MongoConfig::with_database("mongodb://admin:s3cret@db:27017/shop", "shop");
        assert_eq!(config.redacted_url(), "mongodb://***@db:27017/shop");

        let plain = MongoConfig::default();
        assert_eq!(plain.redacted_url(), DEFAULT_URL);
    }

    #[cfg(feature = "config")]
    const ALL_KEYS: [&str; 8] = [
        "MONGODB_URI",
        "MONGODB_URL",
        "MONGO_URL",
        "DATABASE_NAME",
        "MONGODB_DATABASE",
        "MONGO_DATABASE",
        "MONGODB_MAX_POOL_SIZE",
        "MONGODB_APP_NAME",
    ];

    #[cfg(feature = "config")]
    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars_unset(ALL_KEYS, || {
            let config = MongoConfig::from_env().unwrap();
            assert_eq!(config.url, DEFAULT_URL);
            assert_eq!(config.database, DEFAULT_DATABASE);
            assert!(config.app_name.is_none());
        });
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_from_env_prefers_canonical_names() {
        temp_env::with_vars_unset(ALL_KEYS, || {
            temp_env::with_vars(
                [
                    ("MONGODB_URI", Some("mongodb://primary:27017")),
                    ("MONGODB_URL", Some("mongodb://alias:27017")),
                    ("DATABASE_NAME", Some("catalog")),
                    ("MONGODB_MAX_POOL_SIZE", Some("50")),
                ],
                || {
                    let config = MongoConfig::from_env().unwrap();
                    assert_eq!(config.url, "mongodb://primary:27017");
                    assert_eq!(config.database, "catalog");
                    assert_eq!(config.max_pool_size, 50);
                },
            );
        });
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_from_env_falls_back_to_aliases() {
        temp_env::with_vars_unset(ALL_KEYS, || {
            temp_env::with_vars(
                [
                    ("MONGO_URL", Some("mongodb://fallback:27017")),
                    ("MONGODB_DATABASE", Some("fallbackdb")),
                ],
                || {
                    let config = MongoConfig::from_env().unwrap();
                    assert_eq!(config.url, "mongodb://fallback:27017");
                    assert_eq!(config.database, "fallbackdb");
                },
            );
        });
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_from_env_rejects_bad_pool_size() {
        temp_env::with_vars_unset(ALL_KEYS, || {
            temp_env::with_var("MONGODB_MAX_POOL_SIZE", Some("lots"), || {
                let err = MongoConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("MONGODB_MAX_POOL_SIZE"));
            });
        });
    }
}
