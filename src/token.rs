//! Session token state.

use base64::Engine as _;
use chrono::Utc;

use crate::models::{TokenClaims, TokenResult};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    /// Absolute expiry in epoch seconds. Zero means "never fetched".
    pub expires_at: i64,
    pub name: Option<String>,
}

impl Token {
    /// Valid only when non-empty and the expiry is positive and in the future.
    pub fn is_valid_at(&self, now: i64) -> bool {
        !self.value.is_empty() && self.expires_at > 0 && self.expires_at > now
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now().timestamp())
    }

    /// Build a token from a FetchToken result.
    ///
    /// The expiry comes from `payload.exp`; when the reply has none it is
    /// read from the unverified claims segment of the JWT itself.
    pub fn from_result(result: TokenResult, requested_name: Option<&str>) -> Result<Self> {
        if result.token.is_empty() {
            return Err(Error::Token("FetchToken returned an empty token".to_string()));
        }

        let claims = match result.payload {
            Some(claims) if claims.exp_secs().is_some() => claims,
            _ => decode_jwt_claims(&result.token)?,
        };
        let expires_at = claims
            .exp_secs()
            .ok_or_else(|| Error::Token("token has no exp claim".to_string()))?;

        Ok(Self {
            value: result.token,
            expires_at,
            name: claims.name.or_else(|| requested_name.map(str::to_string)),
        })
    }
}

fn decode_jwt_claims(token: &str) -> Result<TokenClaims> {
    let segment = token
        .split('.')
        .nth(1)
        .ok_or_else(|| Error::Token("token is not a JWT and no payload was returned".to_string()))?;

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| Error::Token(format!("Failed to decode JWT claims: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| Error::Token(format!("Failed to parse JWT claims: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jwt_with_claims(claims: serde_json::Value) -> String {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.sig",
            engine.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
            engine.encode(claims.to_string())
        )
    }

    #[test]
    fn test_zero_expiry_is_never_valid() {
        let token = Token {
            value: "T".to_string(),
            expires_at: 0,
            name: None,
        };
        assert!(!token.is_valid_at(-10));
        assert!(!token.is_valid());
    }

    #[test]
    fn test_expiry_must_be_strictly_in_future() {
        let token = Token {
            value: "T".to_string(),
            expires_at: 1000,
            name: None,
        };
        assert!(token.is_valid_at(999));
        assert!(!token.is_valid_at(1000));
        assert!(!token.is_valid_at(1001));
    }

    #[test]
    fn test_empty_value_is_invalid() {
        let token = Token {
            value: String::new(),
            expires_at: i64::MAX,
            name: None,
        };
        assert!(!token.is_valid_at(0));
    }

    #[test]
    fn test_from_result_prefers_payload_exp() {
        let result: TokenResult = serde_json::from_value(json!({
            "token": "T",
            "payload": { "exp": 2000 }
        }))
        .unwrap();

        let token = Token::from_result(result, Some("ci")).unwrap();
        assert_eq!(token.value, "T");
        assert_eq!(token.expires_at, 2000);
        assert_eq!(token.name.as_deref(), Some("ci"));
    }

    #[test]
    fn test_from_result_falls_back_to_jwt_claims() {
        let jwt = jwt_with_claims(json!({ "exp": 3000, "name": "nightly" }));
        let result: TokenResult = serde_json::from_value(json!({ "token": jwt })).unwrap();

        let token = Token::from_result(result, None).unwrap();
        assert_eq!(token.expires_at, 3000);
        assert_eq!(token.name.as_deref(), Some("nightly"));
    }

    #[test]
    fn test_from_result_without_any_exp_fails() {
        let result: TokenResult = serde_json::from_value(json!({ "token": "opaque" })).unwrap();
        let err = Token::from_result(result, None).unwrap_err();
        assert!(matches!(err, Error::Token(_)));
    }
}
