use std::time::Duration;

// ============================================================================
// Store Configuration
// ============================================================================
//
// Read from CRUDS_* environment variables; anything unset keeps its default.
//
// ============================================================================

pub const ENV_PREFIX: &str = "CRUDS_";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    /// MongoDB connection string
    pub uri: String,
    pub database: String,
    pub collection: String,
    /// Upper bound for a single store round trip
    pub operation_timeout: Duration,
    /// Port for the /metrics endpoint; no server when unset
    pub metrics_port: Option<u16>,
    /// Drop the whole database when the demo finishes
    pub drop_on_exit: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "cruds".to_string(),
            collection: "users".to_string(),
            operation_timeout: Duration::from_secs(5),
            metrics_port: None,
            drop_on_exit: false,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, e.g. a map in tests
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let mut config = Self::default();

        if let Some(uri) = get("MONGODB_URI") {
            config.uri = uri;
        }
        if let Some(database) = get("DATABASE") {
            config.database = database;
        }
        if let Some(collection) = get("COLLECTION") {
            config.collection = collection;
        }
        if let Some(raw) = get("OPERATION_TIMEOUT_MS") {
            let millis: u64 = parse_value("OPERATION_TIMEOUT_MS", &raw)?;
            if millis == 0 {
                return Err(invalid("OPERATION_TIMEOUT_MS", &raw, "must be greater than zero"));
            }
            config.operation_timeout = Duration::from_millis(millis);
        }
        if let Some(raw) = get("METRICS_PORT") {
            config.metrics_port = Some(parse_value("METRICS_PORT", &raw)?);
        }
        if let Some(raw) = get("DROP_ON_EXIT") {
            config.drop_on_exit = parse_bool("DROP_ON_EXIT", &raw)?;
        }

        Ok(config)
    }
}

fn invalid(name: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{}{}", ENV_PREFIX, name),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| invalid(name, raw, e.to_string()))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, raw, "expected a boolean")),
    }
}
