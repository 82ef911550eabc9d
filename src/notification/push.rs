use axum::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PushError {
    /// The provider no longer accepts this registration token.
    #[error("invalid registration token")]
    InvalidToken,
    #[error("push delivery failed: {0}")]
    Delivery(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, token: &str, title: &str, body: &str, link: &str) -> Result<(), PushError>;
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    #[serde(default)]
    failure: i64,
    #[serde(default)]
    results: Vec<FcmResult>,
}

#[derive(Debug, Deserialize)]
struct FcmResult {
    error: Option<String>,
}

fn classify(response: &FcmResponse) -> Result<(), PushError> {
    if response.failure == 0 {
        return Ok(());
    }
    match response.results.iter().find_map(|r| r.error.as_deref()) {
        Some("InvalidRegistration") | Some("NotRegistered") | Some("MismatchSenderId") => {
            Err(PushError::InvalidToken)
        }
        Some(other) => Err(PushError::Delivery(other.to_string())),
        None => Err(PushError::Delivery("unknown failure".to_string())),
    }
}

/// Client of the FCM legacy HTTP endpoint. Without a server key every send is
/// a logged no-op.
#[derive(Clone)]
pub struct FcmClient {
    http: reqwest::Client,
    endpoint: String,
    server_key: Option<String>,
}

impl FcmClient {
    pub fn new(endpoint: String, server_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            server_key: server_key.filter(|k| !k.is_empty()),
        }
    }
}

#[async_trait]
impl PushSender for FcmClient {
    async fn send(&self, token: &str, title: &str, body: &str, link: &str) -> Result<(), PushError> {
        let Some(server_key) = &self.server_key else {
            tracing::debug!(token, "Push disabled, skipping message");
            return Ok(());
        };

        let payload = json!({
            "to": token,
            "notification": { "title": title, "body": body, "click_action": link },
            "data": { "link": link },
        });

        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("key={}", server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| PushError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PushError::Delivery(format!("http status {}", status)));
        }

        let parsed: FcmResponse = response
            .json()
            .await
            .map_err(|e| PushError::Delivery(e.to_string()))?;

        classify(&parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: serde_json::Value) -> FcmResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_success_response() {
        let parsed = response(json!({ "success": 1, "failure": 0, "results": [{ "message_id": "m1" }] }));
        assert_eq!(classify(&parsed), Ok(()));
    }

    #[test]
    fn test_unregistered_token_is_invalid() {
        let parsed = response(json!({ "success": 0, "failure": 1, "results": [{ "error": "NotRegistered" }] }));
        assert_eq!(classify(&parsed), Err(PushError::InvalidToken));

        let parsed = response(json!({ "failure": 1, "results": [{ "error": "InvalidRegistration" }] }));
        assert_eq!(classify(&parsed), Err(PushError::InvalidToken));
    }

    #[test]
    fn test_other_failures_are_delivery_errors() {
        let parsed = response(json!({ "failure": 1, "results": [{ "error": "Unavailable" }] }));
        assert_eq!(classify(&parsed), Err(PushError::Delivery("Unavailable".into())));
    }

    #[tokio::test]
    async fn test_without_server_key_send_is_noop() {
        let client = FcmClient::new("http://127.0.0.1:9/fcm/send".into(), Some(String::new()));
        assert_eq!(client.send("token", "title", "body", "/link").await, Ok(()));
    }
}
