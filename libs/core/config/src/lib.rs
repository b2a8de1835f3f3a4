//! Shared configuration primitives for the users workspace.
//!
//! Everything here is loaded from environment variables; there is no config
//! file layer. Service binaries compose these pieces into their own `Config`.

pub mod server;
pub mod tracing;

use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Deployment environment, read from `APP_ENV`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Name and version reported by `/health`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// Builds an [`AppInfo`] from the calling crate's package metadata.
#[macro_export]
macro_rules! app_info {
    () => {
        $crate::AppInfo {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    };
}

/// Configuration that can be loaded from environment variables.
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// First variable in `keys` that is set wins. Lets a setting accept aliases
/// such as `MONGODB_URL` and `MONGO_URL`.
pub fn env_first_of(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| env::var(key).ok())
}

/// Parses an optional variable, falling back to `default` when unset.
pub fn env_parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        for value in ["production", "PRODUCTION", "Production"] {
            temp_env::with_var("APP_ENV", Some(value), || {
                assert_eq!(Environment::from_env(), Environment::Production);
            });
        }
    }

    #[test]
    fn test_environment_unknown_defaults_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_app_info_uses_package_metadata() {
        let info = app_info!();
        assert_eq!(info.name, "core_config");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("USERS_TEST_VAR", Some("set"), || {
            assert_eq!(env_or_default("USERS_TEST_VAR", "fallback"), "set");
        });
        temp_env::with_var_unset("USERS_TEST_VAR", || {
            assert_eq!(env_or_default("USERS_TEST_VAR", "fallback"), "fallback");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("USERS_REQUIRED_VAR", || {
            let err = env_required("USERS_REQUIRED_VAR").unwrap_err();
            assert!(err.to_string().contains("USERS_REQUIRED_VAR"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_first_of_prefers_earlier_key() {
        temp_env::with_vars(
            [("USERS_PRIMARY", Some("a")), ("USERS_ALIAS", Some("b"))],
            || {
                assert_eq!(
                    env_first_of(&["USERS_PRIMARY", "USERS_ALIAS"]).as_deref(),
                    Some("a")
                );
            },
        );
        temp_env::with_vars(
            [("USERS_PRIMARY", None::<&str>), ("USERS_ALIAS", Some("b"))],
            || {
                assert_eq!(
                    env_first_of(&["USERS_PRIMARY", "USERS_ALIAS"]).as_deref(),
                    Some("b")
                );
            },
        );
    }

    #[test]
    fn test_env_parse_or() {
        temp_env::with_var_unset("USERS_POOL", || {
            assert_eq!(env_parse_or("USERS_POOL", 10u32).unwrap(), 10);
        });
        temp_env::with_var("USERS_POOL", Some("25"), || {
            assert_eq!(env_parse_or("USERS_POOL", 10u32).unwrap(), 25);
        });
        temp_env::with_var("USERS_POOL", Some("lots"), || {
            let err = env_parse_or("USERS_POOL", 10u32).unwrap_err();
            assert!(err.to_string().contains("USERS_POOL"));
        });
    }
}
