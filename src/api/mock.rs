use super::CdnzzApi;
use crate::params::Params;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One call seen by [`MockCdnzzClient`], with absent parameters already dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub fields: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

enum MockResponse {
    Ok(Value),
    Provider { code: i64, msg: String },
}

/// In-memory stand-in for [`super::CdnzzClient`].
///
/// Queued responses are returned in order; once the queue is empty every
/// call succeeds with `null`.
#[derive(Clone)]
pub struct MockCdnzzClient {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockCdnzzClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, result: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Ok(result));
        self
    }

    pub fn with_provider_error(self, code: i64, msg: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Provider {
                code,
                msg: msg.to_string(),
            });
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockCdnzzClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdnzzApi for MockCdnzzClient {
    async fn invoke(&self, method: &str, params: Params) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            fields: params.into_fields(),
        });

        match self.responses.lock().unwrap().pop_front() {
            Some(MockResponse::Ok(value)) => Ok(value),
            Some(MockResponse::Provider { code, msg }) => Err(Error::Provider {
                code,
                msg,
                result: None,
            }),
            None => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_returns_queued_responses_in_order() {
        let client = MockCdnzzClient::new()
            .with_response(json!({ "domain": "example.com" }))
            .with_provider_error(5, "domain already exists");

        let first = client.add_domain("example.com").await.unwrap();
        assert_eq!(first["domain"], "example.com");

        let err = client.add_domain("example.com").await.unwrap_err();
        assert_eq!(err.code(), Some(5));

        let third = client.list_domains().await.unwrap();
        assert!(third.is_null());
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_records_filtered_fields() {
        let client = MockCdnzzClient::new();
        client
            .invoke(
                "Custom",
                Params::new().with("a", "1").with_opt("b", None::<String>),
            )
            .await
            .unwrap();

        let calls = client.get_calls();
        assert_eq!(calls[0].method, "Custom");
        assert_eq!(calls[0].field("a"), Some("1"));
        assert_eq!(calls[0].field("b"), None);
    }
}
