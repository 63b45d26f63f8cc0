//! Data models and structures
//!
//! Wire envelope, token-fetch payloads and the small enums the named
//! operations take.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{error, msg, result}` envelope every API reply uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub error: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub result: Value,
}

/// `result` of a successful FetchToken call.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResult {
    pub token: String,
    #[serde(default)]
    pub payload: Option<TokenClaims>,
}

/// Claims the provider puts in the token. Only `exp` is used here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub exp: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
}

impl TokenClaims {
    /// Expiry as whole epoch seconds. Fractional values are truncated.
    pub fn exp_secs(&self) -> Option<i64> {
        match self.exp.as_ref()? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    #[serde(rename = "CNAME")]
    Cname,
    A,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Cname => "CNAME",
            RecordType::A => "A",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CNAME" => Ok(RecordType::Cname),
            "A" => Ok(RecordType::A),
            _ => Err(format!("Invalid record type '{}'. Expected CNAME or A", s)),
        }
    }
}

/// How domain ownership is proven: a DNS TXT record or an uploaded HTML file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyType {
    Dns,
    File,
}

impl VerifyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyType::Dns => "dns",
            VerifyType::File => "file",
        }
    }
}

impl std::str::FromStr for VerifyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dns" => Ok(VerifyType::Dns),
            "file" => Ok(VerifyType::File),
            _ => Err(format!("Invalid verify type '{}'. Expected dns or file", s)),
        }
    }
}

/// Format a day the way the statistics endpoints expect it (`YYYYMMDD`).
pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_defaults_missing_fields() {
        let resp: ApiResponse = serde_json::from_value(json!({ "error": 0 })).unwrap();
        assert_eq!(resp.error, 0);
        assert_eq!(resp.msg, "");
        assert!(resp.result.is_null());
    }

    #[test]
    fn test_token_result_with_payload() {
        let result: TokenResult = serde_json::from_value(json!({
            "token": "T",
            "payload": { "exp": 1700000000, "name": "deploy" }
        }))
        .unwrap();

        assert_eq!(result.token, "T");
        let claims = result.payload.unwrap();
        assert_eq!(claims.exp_secs(), Some(1700000000));
        assert_eq!(claims.name.as_deref(), Some("deploy"));
    }

    #[test]
    fn test_exp_accepts_float_and_string() {
        let float = TokenClaims {
            exp: Some(json!(1700000000.75)),
            name: None,
        };
        let string = TokenClaims {
            exp: Some(json!("1700000000")),
            name: None,
        };
        assert_eq!(float.exp_secs(), Some(1700000000));
        assert_eq!(string.exp_secs(), Some(1700000000));
        assert_eq!(TokenClaims::default().exp_secs(), None);
    }

    #[test]
    fn test_record_type_parse_and_display() {
        assert_eq!("cname".parse::<RecordType>().unwrap(), RecordType::Cname);
        assert_eq!("A".parse::<RecordType>().unwrap(), RecordType::A);
        assert!("MX".parse::<RecordType>().is_err());
        assert_eq!(RecordType::Cname.to_string(), "CNAME");
    }

    #[test]
    fn test_format_day() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_day(day), "20240105");
    }
}
