use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 6001;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("You need to add the {0} to the env")]
    Missing(&'static str),
    #[error("{name} must be a number, got {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database_name: String,
    pub salt: String,
    pub max_pool_size: u32,
    pub request_timeout: Duration,
    /// Tokens older than this are refused. `None` keeps them valid forever.
    pub token_ttl: Option<chrono::Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let number = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(name)
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::Invalid { name, value })
                })
                .transpose()
        };

        let port = match number("PORT")? {
            Some(port) => u16::try_from(port).map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: port.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let max_pool_size = match number("MONGODB_MAX_POOL_SIZE")? {
            Some(size) => u32::try_from(size).map_err(|_| ConfigError::Invalid {
                name: "MONGODB_MAX_POOL_SIZE",
                value: size.to_string(),
            })?,
            None => 10,
        };
        let token_ttl = number("TOKEN_TTL_HOURS")?
            .map(|hours| {
                i64::try_from(hours)
                    .ok()
                    .and_then(chrono::Duration::try_hours)
                    .ok_or(ConfigError::Invalid {
                        name: "TOKEN_TTL_HOURS",
                        value: hours.to_string(),
                    })
            })
            .transpose()?;

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            mongodb_uri: required("MONGODB_URI")?,
            database_name: lookup("DATABASE_NAME").unwrap_or_else(|| "OpenSplit".to_string()),
            salt: required("SALT")?,
            max_pool_size,
            request_timeout: Duration::from_secs(number("REQUEST_TIMEOUT_SECS")?.unwrap_or(30)),
            token_ttl,
        })
    }
}
