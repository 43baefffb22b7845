//! API configuration
//!
//! Settings come from `API_`-prefixed environment variables. The unprefixed
//! deployment variables `PORT`, `JWT_SECRET`, `DATABASE_URL`, `CORS_ORIGIN`
//! and `APP_ENV`/`NODE_ENV` take precedence when set.

use std::collections::HashMap;

use serde::Deserialize;

/// Placeholder secret that production refuses to start with
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Lifetime of issued tokens in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Upper bound of the connection pool
    pub db_max_connections: u32,
    /// Log filter; falls back to a per-environment default when unset
    pub log_level: Option<String>,
    /// Directory holding the log files
    pub log_dir: String,
    /// Deployment environment, `production` hides internal error detail
    pub environment: String,
    /// Allowed CORS origin, any origin when unset
    pub cors_origin: Option<String>,
    /// Requests allowed per source address per window
    pub rate_limit_max: u32,
    /// Rate limit window length in seconds
    pub rate_limit_window_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/claims".to_string(),
            db_max_connections: 10,
            log_level: None,
            log_dir: "logs".to_string(),
            environment: "development".to_string(),
            cors_origin: None,
            rate_limit_max: 100,
            rate_limit_window_secs: 15 * 60,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Loads configuration from an explicit set of variables
    ///
    /// # Errors
    ///
    /// Fails when a value cannot be parsed, or when production settings still
    /// carry the placeholder token secret.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, config::ConfigError> {
        let plain = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();
        let environment = plain("APP_ENV").or_else(|| plain("NODE_ENV"));

        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("API")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .set_override_option("port", plain("PORT"))?
            .set_override_option("jwt_secret", plain("JWT_SECRET"))?
            .set_override_option("database_url", plain("DATABASE_URL"))?
            .set_override_option("cors_origin", plain("CORS_ORIGIN"))?
            .set_override_option("environment", environment)?
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    fn validated(self) -> Result<Self, config::ConfigError> {
        if self.is_production() && (self.jwt_secret.is_empty() || self.jwt_secret == DEFAULT_JWT_SECRET) {
            return Err(config::ConfigError::Message(
                "JWT_SECRET must be set to a non-default value in production".to_string(),
            ));
        }
        Ok(self)
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True when running with production settings
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// The log filter to use when `RUST_LOG` is not set
    pub fn effective_log_level(&self) -> &str {
        match &self.log_level {
            Some(level) => level,
            None if self.is_production() => "info",
            None => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ApiConfig::from_vars(HashMap::new()).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.rate_limit_max, 100);
        assert_eq!(config.rate_limit_window_secs, 900);
        assert_eq!(config.cors_origin, None);
        assert!(!config.is_production());
        assert_eq!(config.effective_log_level(), "debug");
    }

    #[test]
    fn test_prefixed_variables() {
        let config = ApiConfig::from_vars(vars(&[
            ("API_PORT", "8081"),
            ("API_RATE_LIMIT_MAX", "5"),
            ("API_LOG_LEVEL", "warn"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.rate_limit_max, 5);
        assert_eq!(config.effective_log_level(), "warn");
    }

    #[test]
    fn test_plain_variables_override_prefixed() {
        let config = ApiConfig::from_vars(vars(&[
            ("API_PORT", "8081"),
            ("PORT", "9000"),
            ("JWT_SECRET", "s3cret"),
            ("NODE_ENV", "production"),
            ("CORS_ORIGIN", "https://claims.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert!(config.is_production());
        assert_eq!(config.effective_log_level(), "info");
        assert_eq!(config.cors_origin.as_deref(), Some("https://claims.example.com"));
        assert_eq!(config.server_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_production_rejects_placeholder_secret() {
        let err = ApiConfig::from_vars(vars(&[("APP_ENV", "production")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        let explicit = ApiConfig::from_vars(vars(&[
            ("APP_ENV", "production"),
            ("API_JWT_SECRET", DEFAULT_JWT_SECRET),
        ]));
        assert!(explicit.is_err());
    }

    #[test]
    fn test_placeholder_secret_allowed_outside_production() {
        let config = ApiConfig::from_vars(vars(&[("APP_ENV", "staging")])).unwrap();
        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);
    }
}
