//! Client configuration
//!
//! Credentials and connection settings, either built in code or read from
//! the environment (optionally via a `.env` file).

use std::fmt;
use std::time::Duration;

use crate::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://www.cdnzz.com/apiv3/json";

/// Provider code meaning "token invalid or expired".
pub const DEFAULT_INVALID_TOKEN_CODE: i64 = 10260;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Account identifier and secret key. Fixed for the life of a client.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub invalid_token_code: i64,
    pub user_agent: String,
    pub timeout: Duration,
    /// Fetch a token before the first call and once more on an invalid-token reply.
    pub auto_refresh: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            invalid_token_code: DEFAULT_INVALID_TOKEN_CODE,
            user_agent: default_user_agent(),
            timeout: DEFAULT_TIMEOUT,
            auto_refresh: true,
        }
    }
}

impl ClientConfig {
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_auto_refresh(mut self, auto_refresh: bool) -> Self {
        self.auto_refresh = auto_refresh;
        self
    }

    pub fn with_invalid_token_code(mut self, code: i64) -> Self {
        self.invalid_token_code = code;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub fn default_user_agent() -> String {
    format!(
        "CDNZZ-SDK/3.0; Rust/{}; {}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub client: ClientConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_dotenv(dotenvy::dotenv().map(|_| ()))?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{} not set", key)))
        };

        let credentials = Credentials::new(required("CDNZZ_USER")?, required("CDNZZ_SECRET_KEY")?);

        let mut client = ClientConfig::default();
        if let Some(url) = lookup("CDNZZ_API_URL") {
            client.api_url = url;
        }
        if let Some(code) = lookup("CDNZZ_INVALID_TOKEN_CODE") {
            client.invalid_token_code = code.trim().parse().map_err(|_| {
                Error::Config(format!("CDNZZ_INVALID_TOKEN_CODE is not an integer: {}", code))
            })?;
        }
        if let Some(secs) = lookup("CDNZZ_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("CDNZZ_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            client.timeout = Duration::from_secs(secs);
        }
        if let Some(flag) = lookup("CDNZZ_AUTO_REFRESH") {
            client.auto_refresh = parse_bool(&flag).ok_or_else(|| {
                Error::Config(format!("CDNZZ_AUTO_REFRESH is not a boolean: {}", flag))
            })?;
        }

        Ok(Self {
            credentials,
            client,
        })
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn load_dotenv(loaded: std::result::Result<(), dotenvy::Error>) -> Result<()> {
    match loaded {
        Err(e) if !e.not_found() => Err(Error::EnvVar(e)),
        _ => Ok(()),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.invalid_token_code, 10260);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.auto_refresh);
        assert!(config.user_agent.starts_with("CDNZZ-SDK/3.0; Rust/"));
    }

    #[test]
    fn test_from_lookup_reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("CDNZZ_USER", "ops@example.com"),
            ("CDNZZ_SECRET_KEY", "s3cret"),
            ("CDNZZ_API_URL", "http://127.0.0.1:18888/apiv3/json"),
            ("CDNZZ_INVALID_TOKEN_CODE", "4242"),
            ("CDNZZ_TIMEOUT_SECS", "5"),
            ("CDNZZ_AUTO_REFRESH", "no"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.user, "ops@example.com");
        assert_eq!(config.credentials.secret_key, "s3cret");
        assert_eq!(config.client.api_url, "http://127.0.0.1:18888/apiv3/json");
        assert_eq!(config.client.invalid_token_code, 4242);
        assert_eq!(config.client.timeout, Duration::from_secs(5));
        assert!(!config.client.auto_refresh);
    }

    #[test]
    fn test_from_lookup_requires_credentials() {
        let err = Config::from_lookup(lookup_from(&[("CDNZZ_USER", "ops@example.com")]))
            .unwrap_err();
        assert!(err.to_string().contains("CDNZZ_SECRET_KEY not set"));
    }

    #[test]
    fn test_from_lookup_rejects_bad_code() {
        let err = Config::from_lookup(lookup_from(&[
            ("CDNZZ_USER", "u"),
            ("CDNZZ_SECRET_KEY", "k"),
            ("CDNZZ_INVALID_TOKEN_CODE", "abc"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_dotenv_is_ignored() {
        let missing = dotenvy::Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            ".env not found",
        ));
        assert!(load_dotenv(Err(missing)).is_ok());
        assert!(load_dotenv(Ok(())).is_ok());
    }

    #[test]
    fn test_malformed_dotenv_is_reported() {
        let malformed = dotenvy::Error::LineParse("CDNZZ_USER 'oops".to_string(), 10);
        let err = load_dotenv(Err(malformed)).unwrap_err();
        assert!(matches!(err, Error::EnvVar(_)));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("ops@example.com", "s3cret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("ops@example.com"));
        assert!(!debug.contains("s3cret"));
    }
}
