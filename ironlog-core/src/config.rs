//! Process-wide configuration.
//!
//! Built once at startup and handed by reference to the components that need
//! it. Nothing in the crate reads the environment after this point.

use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// HS256 keys shorter than this are refused.
pub const MIN_SIGNING_KEY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be specified or present in the environment")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Symmetric key used to sign bearer tokens. Never printed.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid {
                key: "SIGNING_KEY",
                reason: format!("must be at least {MIN_SIGNING_KEY_LEN} bytes"),
            });
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub signing_key: SigningKey,
    /// Audience expected in identity-provider tokens.
    pub google_client_id: String,
    pub google_certs_url: String,
    pub bind_addr: SocketAddr,
    pub allowed_origin: Option<String>,
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let database_url = Self::database_url_from_lookup(&lookup)?;
        let signing_key = SigningKey::new(require("SIGNING_KEY")?)?;
        let google_client_id = require("GOOGLE_CLIENT_ID")?;
        let google_certs_url = get("GOOGLE_CERTS_URL").unwrap_or_else(|| GOOGLE_CERTS_URL.into());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.into())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let debug = match get("DEBUG") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::Invalid {
                key: "DEBUG",
                reason: format!("expected a boolean, got {v:?}"),
            })?,
        };

        Ok(Self {
            database_url,
            signing_key,
            google_client_id,
            google_certs_url,
            bind_addr,
            allowed_origin: get("ALLOWED_ORIGIN"),
            debug,
        })
    }

    /// Only the database location, for tools that never touch tokens.
    pub fn database_url_from_env() -> Result<String, ConfigError> {
        Self::database_url_from_lookup(|key| std::env::var(key).ok())
    }

    pub fn database_url_from_lookup<F>(lookup: F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn minimal_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://ironlog.db"),
            ("SIGNING_KEY", KEY),
            ("GOOGLE_CLIENT_ID", "client.apps.googleusercontent.com"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(config.google_certs_url, GOOGLE_CERTS_URL);
        assert!(!config.debug);
        assert!(config.allowed_origin.is_none());
        assert_eq!(config.signing_key.as_bytes(), KEY.as_bytes());
    }

    #[test]
    fn database_url_alone_needs_no_auth_keys() {
        let url = Config::database_url_from_lookup(lookup(&[("DATABASE_URL", "ironlog.db")]));
        assert_eq!(url.unwrap(), "ironlog.db");

        assert!(Config::from_lookup(lookup(&[("DATABASE_URL", "ironlog.db")])).is_err());
        assert!(matches!(
            Config::database_url_from_lookup(lookup(&[("DATABASE_URL", " ")])),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn missing_signing_key_is_named() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://ironlog.db"),
            ("GOOGLE_CLIENT_ID", "client"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SIGNING_KEY")));
    }

    #[test]
    fn short_signing_key_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://ironlog.db"),
            ("SIGNING_KEY", "short"),
            ("GOOGLE_CLIENT_ID", "client"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SIGNING_KEY", .. }));
    }

    #[test]
    fn debug_flag_and_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://ironlog.db"),
            ("SIGNING_KEY", KEY),
            ("GOOGLE_CLIENT_ID", "client"),
            ("DEBUG", "true"),
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("ALLOWED_ORIGIN", "https://lift.example.com"),
        ]))
        .unwrap();
        assert!(config.debug);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.allowed_origin.as_deref(), Some("https://lift.example.com"));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://ironlog.db"),
            ("SIGNING_KEY", KEY),
            ("GOOGLE_CLIENT_ID", "client"),
            ("DEBUG", "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DEBUG", .. }));
    }

    #[test]
    fn signing_key_is_redacted() {
        let key = SigningKey::new(KEY).unwrap();
        assert!(!format!("{key:?}").contains(KEY));
    }
}
