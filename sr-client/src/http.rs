//! HTTP client for network-based API calls

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{HealthResponse, ServiceRequestCreate, TicketResponse};

/// Service request collection path
const SR_PATH: &str = "/api/sr/";

/// HTTP client for making requests to the ticket service
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::warn!(status = status.as_u16(), %message, "Ticket service returned an error");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    // ========== Service Request API ==========

    /// Submit a new service request and return the created ticket
    pub async fn submit_service_request(
        &self,
        payload: &ServiceRequestCreate,
    ) -> ClientResult<TicketResponse> {
        let ticket: TicketResponse = self.post(SR_PATH, payload).await?;
        tracing::debug!(ticket_id = %ticket.ticket_id, "Service request created");
        Ok(ticket)
    }

    /// Fetch a single ticket by its numeric id
    pub async fn get_ticket(&self, id: i64) -> ClientResult<TicketResponse> {
        self.get(&format!("{SR_PATH}{id}")).await
    }

    /// Latest tickets, newest first
    pub async fn list_tickets(&self, limit: u32) -> ClientResult<Vec<TicketResponse>> {
        self.get(&format!("{SR_PATH}?limit={limit}")).await
    }

    /// Service liveness
    pub async fn health(&self) -> ClientResult<bool> {
        let health: HealthResponse = self.get("/api/health").await?;
        Ok(health.ok)
    }
}

/// Derive a user-facing message from an error response body.
///
/// `detail` may be a string or a list of `{ "msg": ... }` objects; anything
/// else falls back to `HTTP <status>`.
fn error_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        detail: Option<Value>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|detail| detail_text(&detail))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn detail_text(detail: &Value) -> Option<String> {
    match detail {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
