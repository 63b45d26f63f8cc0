use super::CdnzzApi;
use crate::config::{ClientConfig, Config, Credentials};
use crate::models::{ApiResponse, TokenResult};
use crate::params::Params;
use crate::token::Token;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;

const FETCH_TOKEN: &str = "FetchToken";

/// HTTP client for the CDNZZ API.
///
/// The session token is owned by the client and replaced wholesale on every
/// refresh. Sharing one client between concurrent tasks is memory safe, but
/// two tasks that both see an invalid token will both refresh and the last
/// write wins. Use one client per task, or serialize calls, if that matters.
pub struct CdnzzClient {
    http: Client,
    credentials: Credentials,
    config: ClientConfig,
    token: RwLock<Option<Token>>,
}

impl CdnzzClient {
    pub fn new(user: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        Self::with_config(Credentials::new(user, secret_key), ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self::with_http_client(credentials, config, http))
    }

    /// Use a caller-built `reqwest::Client`. Its own timeout and user agent apply.
    pub fn with_http_client(credentials: Credentials, config: ClientConfig, http: Client) -> Self {
        Self {
            http,
            credentials,
            config,
            token: RwLock::new(None),
        }
    }

    pub fn from_config(config: Config) -> Result<Self> {
        Self::with_config(config.credentials, config.client)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(Config::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn user(&self) -> &str {
        &self.credentials.user
    }

    pub async fn token(&self) -> Option<Token> {
        self.token.read().await.clone()
    }

    /// Replace the session token, e.g. with one persisted by the caller.
    pub async fn set_token(&self, token: Option<Token>) {
        *self.token.write().await = token;
    }

    pub async fn is_token_valid(&self) -> bool {
        self.token
            .read()
            .await
            .as_ref()
            .is_some_and(Token::is_valid)
    }

    /// Fetch a new session token using the secret key and store it.
    ///
    /// `expires_in` asks the server for an expiry of now + `expires_in`;
    /// without it the server's default lifetime applies.
    pub async fn fetch_token(
        &self,
        expires_in: Option<Duration>,
        name: Option<&str>,
    ) -> Result<String> {
        let token_exp = requested_expiry(expires_in, Utc::now().timestamp())?;

        let params = Params::new()
            .with("method", FETCH_TOKEN)
            .with("user", self.credentials.user.as_str())
            .with("secretkey", self.credentials.secret_key.as_str())
            .with_opt("token_exp", token_exp)
            .with_opt("name", name);

        let result = self.send(FETCH_TOKEN, params.into_fields()).await?;
        let result: TokenResult = serde_json::from_value(result)
            .map_err(|e| Error::Token(format!("Unexpected FetchToken result: {}", e)))?;
        let token = Token::from_result(result, name)?;

        tracing::info!(
            expires_at = token.expires_at,
            name = token.name.as_deref().unwrap_or_default(),
            "Fetched CDNZZ token"
        );

        let value = token.value.clone();
        *self.token.write().await = Some(token);
        Ok(value)
    }

    async fn current_token(&self) -> Result<Option<String>> {
        if self.config.auto_refresh && !self.is_token_valid().await {
            return self.fetch_token(None, None).await.map(Some);
        }
        Ok(self.token.read().await.as_ref().map(|t| t.value.clone()))
    }

    async fn dispatch(&self, method: &str, mut params: Params) -> Result<Value> {
        params.insert("method", Some(method.to_string()));
        if !params.contains("user") {
            params.insert("user", Some(self.credentials.user.clone()));
        }

        // Caller authenticates with the secret key itself; no token, no retry.
        if params.contains("secretkey") {
            return self.send(method, params.into_fields()).await;
        }

        let mut refreshed = false;
        loop {
            let mut attempt = params.clone();
            if let Some(token) = self.current_token().await? {
                attempt.insert("token", Some(token));
            }

            match self.send(method, attempt.into_fields()).await {
                Err(err)
                    if self.config.auto_refresh
                        && !refreshed
                        && err.is_invalid_token(self.config.invalid_token_code) =>
                {
                    tracing::warn!(method, "CDNZZ rejected token, refreshing and retrying once");
                    refreshed = true;
                    self.fetch_token(None, None).await?;
                }
                result => return result,
            }
        }
    }

    async fn send(&self, method: &str, fields: Vec<(String, String)>) -> Result<Value> {
        tracing::debug!(method, url = %self.config.api_url, "Sending CDNZZ request");

        let response = self
            .http
            .post(&self.config.api_url)
            .form(&fields)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to CDNZZ: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(method, %status, "CDNZZ returned non-success HTTP status");
        }

        let envelope: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse CDNZZ response: {}\nBody: {}", e, body);
            Error::Parse {
                source: e,
                body: body.clone(),
            }
        })?;

        if envelope.error != 0 {
            tracing::debug!(method, code = envelope.error, msg = %envelope.msg, "CDNZZ API error");
            return Err(Error::Provider {
                code: envelope.error,
                msg: envelope.msg,
                result: Some(envelope.result).filter(|r| !r.is_null()),
            });
        }

        Ok(envelope.result)
    }
}

/// Absolute `token_exp` for a requested lifetime. A zero lifetime counts as
/// not requested.
fn requested_expiry(expires_in: Option<Duration>, now: i64) -> Result<Option<String>> {
    let Some(expires_in) = expires_in.filter(|d| d.as_secs() > 0) else {
        return Ok(None);
    };

    i64::try_from(expires_in.as_secs())
        .ok()
        .and_then(|secs| now.checked_add(secs))
        .map(|exp| Some(exp.to_string()))
        .ok_or_else(|| {
            Error::Token(format!(
                "Requested token lifetime of {}s is out of range",
                expires_in.as_secs()
            ))
        })
}

#[async_trait]
impl CdnzzApi for CdnzzClient {
    async fn invoke(&self, method: &str, params: Params) -> Result<Value> {
        self.dispatch(method, params).await
    }
}
