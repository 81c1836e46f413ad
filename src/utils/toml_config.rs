//! TOML-based configuration for the task tracker
//!
//! Infrastructure settings (server, auth, database) are read once from
//! `tasktrack.toml` at startup. Secrets are never stored in the file itself;
//! the file names the environment variable that holds them.
//!
//! The configuration is not hot-reloaded: the token signing secret must stay
//! fixed for the life of the process.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum accepted length, in bytes, of the token signing secret
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime: ten years.
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Root configuration structure loaded from tasktrack.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskTrackConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Token lifetime in seconds
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_token_ttl_secs() -> i64 {
    // 5 hours
    5 * 60 * 60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "./data/tasktrack.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl TaskTrackConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: TaskTrackConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration, including the referenced secret.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.token_ttl_secs <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_ttl_secs must be positive, got {}",
                self.auth.token_ttl_secs
            )));
        }
        if self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_ttl_secs must be at most {}, got {}",
                MAX_TOKEN_TTL_SECS, self.auth.token_ttl_secs
            )));
        }

        let secret = self.jwt_secret()?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ValidationError(format!(
                "{} must be at least {} characters long",
                self.auth.jwt_secret_env, MIN_SECRET_LEN
            )));
        }

        Ok(())
    }

    /// Resolve an environment variable
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.jwt_secret_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LONG_SECRET: &str = "a-test-secret-that-is-long-enough-for-hs256";

    fn create_test_config(secret_env: &str) -> String {
        format!(
            r#"
[server]
host = "0.0.0.0"
port = 8080
log_level = "debug"

[auth]
jwt_secret_env = "{}"
token_ttl_secs = 900

[database]
url = ":memory:"
"#,
            secret_env
        )
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_and_validate() {
        std::env::set_var("TT_TEST_SECRET_PARSE", LONG_SECRET);
        let file = write_config(&create_test_config("TT_TEST_SECRET_PARSE"));

        let config = TaskTrackConfig::load(file.path()).expect("config should load");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.auth.token_ttl_secs, 900);
        assert_eq!(config.database.url, ":memory:");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.jwt_secret().unwrap(), LONG_SECRET);
    }

    #[test]
    fn test_defaults_apply_to_missing_sections() {
        let config: TaskTrackConfig = toml::from_str("").unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.jwt_secret_env, "JWT_SECRET");
        assert_eq!(config.auth.token_ttl_secs, 18000);
        assert_eq!(config.database.url, "./data/tasktrack.db");
    }

    #[test]
    fn test_missing_file() {
        let result = TaskTrackConfig::load("/nonexistent/tasktrack.toml");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_missing_secret_env_var() {
        std::env::remove_var("TT_TEST_SECRET_UNSET");
        let file = write_config(&create_test_config("TT_TEST_SECRET_UNSET"));

        let result = TaskTrackConfig::load(file.path());

        assert!(matches!(result, Err(ConfigError::MissingEnvVar(name)) if name == "TT_TEST_SECRET_UNSET"));
    }

    #[test]
    fn test_short_secret_rejected() {
        std::env::set_var("TT_TEST_SECRET_SHORT", "too-short");
        let file = write_config(&create_test_config("TT_TEST_SECRET_SHORT"));

        let result = TaskTrackConfig::load(file.path());

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        std::env::set_var("TT_TEST_SECRET_TTL", LONG_SECRET);
        let mut config: TaskTrackConfig = toml::from_str(
            r#"
[auth]
jwt_secret_env = "TT_TEST_SECRET_TTL"
token_ttl_secs = 0
"#,
        )
        .unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.auth.token_ttl_secs = 60;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_excessive_ttl_rejected() {
        std::env::set_var("TT_TEST_SECRET_MAX_TTL", LONG_SECRET);
        let mut config = TaskTrackConfig::default();
        config.auth.jwt_secret_env = "TT_TEST_SECRET_MAX_TTL".to_string();

        config.auth.token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());

        config.auth.token_ttl_secs = MAX_TOKEN_TTL_SECS + 1;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.auth.token_ttl_secs = i64::MAX / 1000 + 1;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("[server\nport = ");

        let result = TaskTrackConfig::load(file.path());

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
