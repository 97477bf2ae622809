use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::services::webhook_service::UnknownEventPolicy;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_DATABASE: &str = "AlphaEraser";
const DEFAULT_TOLERANCE_SECS: u32 = 300;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration, read from the environment (and `.env` via dotenv).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    /// Clerk/Svix signing secret. Absent is allowed at startup; webhook calls then fail with 500.
    pub webhook_secret: Option<String>,
    pub webhook_tolerance_secs: i64,
    pub unknown_event_policy: UnknownEventPolicy,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Variáveis vazias contam como ausentes
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mongodb_uri = get("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?;

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            mongodb_uri,
            mongodb_database: get("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            webhook_secret: get("CLERK_WEBHOOK_SECRET"),
            // Tolerância negativa rejeitaria todo webhook; u32 recusa na leitura
            webhook_tolerance_secs: i64::from(parse_or::<u32>(
                "WEBHOOK_TOLERANCE_SECS",
                get("WEBHOOK_TOLERANCE_SECS"),
                DEFAULT_TOLERANCE_SECS,
            )?),
            unknown_event_policy: parse_or(
                "UNKNOWN_EVENT_POLICY",
                get("UNKNOWN_EVENT_POLICY"),
                UnknownEventPolicy::default(),
            )?,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|list| {
                    list.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_mongodb_uri_is_required() {
        let err = config_from(&[("CLERK_WEBHOOK_SECRET", "whsec_abc")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("MONGODB_URI"));

        let err = config_from(&[("MONGODB_URI", "   ")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("MONGODB_URI"));
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("MONGODB_URI", "mongodb://localhost:27017")]).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:4000");
        assert_eq!(config.mongodb_database, "AlphaEraser");
        assert_eq!(config.webhook_secret, None);
        assert_eq!(config.webhook_tolerance_secs, 300);
        assert_eq!(config.unknown_event_policy, UnknownEventPolicy::Acknowledge);
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("MONGODB_URI", "mongodb://db:27017"),
            ("MONGODB_DATABASE", "eraser_test"),
            ("CLERK_WEBHOOK_SECRET", "whsec_c2VjcmV0"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("WEBHOOK_TOLERANCE_SECS", "60"),
            ("UNKNOWN_EVENT_POLICY", "reject"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:5173, https://app.example.com,"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.mongodb_database, "eraser_test");
        assert_eq!(config.webhook_secret.as_deref(), Some("whsec_c2VjcmV0"));
        assert_eq!(config.webhook_tolerance_secs, 60);
        assert_eq!(config.unknown_event_policy, UnknownEventPolicy::Reject);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:5173".to_string(), "https://app.example.com".to_string()]
        );
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = config_from(&[("MONGODB_URI", "mongodb://db"), ("PORT", "http")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid { key: "PORT", value: "http".to_string() }
        );

        let err = config_from(&[("MONGODB_URI", "mongodb://db"), ("UNKNOWN_EVENT_POLICY", "maybe")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "UNKNOWN_EVENT_POLICY", .. }));
    }

    #[test]
    fn test_negative_tolerance_is_rejected() {
        let err = config_from(&[("MONGODB_URI", "mongodb://db"), ("WEBHOOK_TOLERANCE_SECS", "-5")])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid { key: "WEBHOOK_TOLERANCE_SECS", value: "-5".to_string() }
        );

        let config = config_from(&[("MONGODB_URI", "mongodb://db"), ("WEBHOOK_TOLERANCE_SECS", "0")])
            .unwrap();
        assert_eq!(config.webhook_tolerance_secs, 0);
    }
}
