use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use super::reply::{is_truthy, value_to_text, ServerReply};
use super::traits::AnswerSource;
use crate::constants::{endpoints, responses};
use crate::error::GatewayError;

/// Posts queries to the CORS relay and normalizes what comes back.
#[derive(Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    query: &'a str,
}

impl RelayClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one query and return the answer as plain text.
    pub async fn send(&self, query: &str) -> Result<String, GatewayError> {
        self.send_for_reply(query).await.map(ServerReply::into_text)
    }

    /// Send one query and return the classified success body.
    pub async fn send_for_reply(&self, query: &str) -> Result<ServerReply, GatewayError> {
        tracing::info!(url = %self.url, "Sending query to relay");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, endpoints::CONTENT_TYPE_JSON)
            .header(ACCEPT, endpoints::CONTENT_TYPE_JSON)
            .json(&RelayRequest { query })
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            let message = compose_api_error(status, &body);
            tracing::warn!("{message}");
            return Err(GatewayError::Api(message));
        }

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Relay answered");
        Ok(ServerReply::parse(&body))
    }
}

#[async_trait::async_trait]
impl AnswerSource for RelayClient {
    async fn ask(&self, query: &str) -> Result<String, GatewayError> {
        self.send(query).await
    }
}

fn network_error(err: reqwest::Error) -> GatewayError {
    tracing::warn!("Relay unreachable: {err}");
    GatewayError::Network(responses::NETWORK_ERROR.to_string())
}

/// Build the message for a non-success response: status line, then any
/// `error`/`message` detail from a JSON body, or a short raw body.
///
/// The reason text is the canonical phrase for the status code, not the
/// phrase the server sent, so a relay with a custom reason phrase still
/// reads as e.g. `500 Internal Server Error`.
pub fn compose_api_error(status: StatusCode, body: &str) -> String {
    let mut message = format!(
        "API request failed: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string();

    // A JSON `null` has no fields to read and is reported like a raw body
    match serde_json::from_str::<Value>(body).ok().filter(|v| !v.is_null()) {
        Some(json) => {
            for key in ["error", "message"] {
                if let Some(detail) = json.get(key).filter(|v| is_truthy(v)) {
                    message.push_str(" - ");
                    message.push_str(&value_to_text(detail));
                }
            }
        }
        None => {
            if !body.is_empty() && body.chars().count() < responses::ERROR_BODY_MAX_CHARS {
                message.push_str(" - ");
                message.push_str(body);
            }
        }
    }

    message
}
