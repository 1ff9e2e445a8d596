use crate::domain::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest page the user pool accepts for a single list call
pub const MAX_LIST_LIMIT: i32 = 60;

/// Configuration port for accessing application configuration
pub trait ConfigurationPort: Send + Sync {
    /// Get identity provider configuration
    fn get_provider_config(&self) -> &ProviderConfig;

    /// Get HTTP client configuration
    fn get_http_config(&self) -> &HttpConfig;

    /// Get logging configuration
    fn get_logging_config(&self) -> &LoggingConfig;

    /// Validate all configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Check if running in development mode
    fn is_development(&self) -> bool;
}

/// Cognito user pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub region: String,
    pub user_pool_id: String,
    pub endpoint: String,
    pub default_list_limit: i32,
}

impl ProviderConfig {
    pub fn new(region: impl Into<String>, user_pool_id: impl Into<String>) -> Self {
        let region = region.into();
        Self {
            endpoint: Self::default_endpoint(&region),
            region,
            user_pool_id: user_pool_id.into(),
            default_list_limit: 20,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn default_endpoint(region: &str) -> String {
        format!("https://cognito-idp.{region}.amazonaws.com")
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.region.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "COGNITO_REGION".to_string(),
            });
        }

        if self.user_pool_id.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "COGNITO_USER_POOL_ID".to_string(),
            });
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "COGNITO_ENDPOINT".to_string(),
                message: "Must start with http:// or https://".to_string(),
            });
        }

        if !(1..=MAX_LIST_LIMIT).contains(&self.default_list_limit) {
            return Err(ConfigError::InvalidValue {
                key: "COGNITO_DEFAULT_LIST_LIMIT".to_string(),
                message: format!("Must be between 1 and {MAX_LIST_LIMIT}"),
            });
        }

        Ok(())
    }

    /// Page size sent to the provider for a requested limit
    pub fn effective_limit(&self, requested: i32) -> i32 {
        if requested > 0 {
            requested.min(MAX_LIST_LIMIT)
        } else {
            self.default_list_limit
        }
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}/", self.endpoint.trim_end_matches('/'))
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
            user_agent: "staff-directory/0.1.0".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "HTTP_TIMEOUT_SECONDS".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.connect_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "HTTP_CONNECT_TIMEOUT_SECONDS".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn get_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn get_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
        }
    }
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log format enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
    Full,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub provider: ProviderConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.provider.validate()?;
        self.http.validate()?;
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Load configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = parse_or(&lookup, "ENVIRONMENT", Environment::Development)?;

        let region = lookup("COGNITO_REGION")
            .or_else(|| lookup("AWS_REGION"))
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "COGNITO_REGION".to_string(),
            })?;

        let user_pool_id =
            lookup("COGNITO_USER_POOL_ID").ok_or_else(|| ConfigError::MissingRequired {
                key: "COGNITO_USER_POOL_ID".to_string(),
            })?;

        let mut provider = ProviderConfig::new(region, user_pool_id);
        if let Some(endpoint) = lookup("COGNITO_ENDPOINT") {
            provider = provider.with_endpoint(endpoint);
        }
        provider.default_list_limit = parse_or(&lookup, "COGNITO_DEFAULT_LIST_LIMIT", 20)?;

        let defaults = HttpConfig::default();
        let http = HttpConfig {
            timeout_seconds: parse_or(&lookup, "HTTP_TIMEOUT_SECONDS", defaults.timeout_seconds)?,
            connect_timeout_seconds: parse_or(
                &lookup,
                "HTTP_CONNECT_TIMEOUT_SECONDS",
                defaults.connect_timeout_seconds,
            )?,
            user_agent: lookup("HTTP_USER_AGENT").unwrap_or(defaults.user_agent),
        };

        let logging = LoggingConfig {
            level: parse_or(&lookup, "LOG_LEVEL", LogLevel::Info)?,
            format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Compact)?,
        };

        let config = AppConfig {
            environment,
            provider,
            http,
            logging,
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> ConfigResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

/// String parsing implementations
impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {s}")),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {s}")),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "full" => Ok(LogFormat::Full),
            _ => Err(format!("Invalid log format: {s}")),
        }
    }
}
