//! HTTP implementation of the edit service client

use super::error::{BackendError, BackendErrorKind};
use super::protocol::{
    ApplyPreviewRequest, ApplyPreviewResponse, ChatRequest, ChatResponse, CreateItineraryRequest,
};
use super::EditBackend;
use crate::model::{Itinerary, PlannerData};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Default service root when `WAYFARER_API_BASE` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Fallback for an error response with an empty body
const GENERIC_FAILURE: &str = "요청을 처리하지 못했습니다.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Edit service client over HTTP
pub struct HttpEditClient {
    client: Client,
    base_url: String,
}

impl HttpEditClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, base_url }
    }

    /// Base URL from `WAYFARER_API_BASE`, default localhost
    pub fn from_env() -> Self {
        let base = std::env::var("WAYFARER_API_BASE")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a new itinerary from planner inputs
    pub async fn create_itinerary(
        &self,
        planner_data: PlannerData,
    ) -> Result<Itinerary, BackendError> {
        self.post("/itineraries", &CreateItineraryRequest { planner_data })
            .await
    }

    /// Fetch an itinerary snapshot by id
    pub async fn fetch_itinerary(&self, itinerary_id: &str) -> Result<Itinerary, BackendError> {
        let url = format!("{}/itineraries/{itinerary_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(classify_transport_error)?;
        decode_response(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(classify_transport_error)?;
        decode_response(response).await
    }
}

#[async_trait]
impl EditBackend for HttpEditClient {
    async fn send_chat(
        &self,
        itinerary_id: &str,
        payload: &ChatRequest,
    ) -> Result<ChatResponse, BackendError> {
        let start = std::time::Instant::now();
        let result = self
            .post(&format!("/itineraries/{itinerary_id}/chat"), payload)
            .await;
        log_outcome("chat", itinerary_id, start, &result);
        result
    }

    async fn apply_preview(
        &self,
        itinerary_id: &str,
        payload: &ApplyPreviewRequest,
    ) -> Result<ApplyPreviewResponse, BackendError> {
        let start = std::time::Instant::now();
        let result = self
            .post(&format!("/itineraries/{itinerary_id}/apply-preview"), payload)
            .await;
        log_outcome("apply-preview", itinerary_id, start, &result);
        result
    }
}

fn log_outcome<T>(
    op: &str,
    itinerary_id: &str,
    start: std::time::Instant,
    result: &Result<T, BackendError>,
) {
    let duration_ms = start.elapsed().as_millis();
    match result {
        Ok(_) => tracing::info!(op, itinerary_id, duration_ms, "edit service call completed"),
        Err(e) => tracing::warn!(
            op,
            itinerary_id,
            duration_ms,
            kind = ?e.kind,
            error = %e.message,
            "edit service call failed"
        ),
    }
}

fn classify_transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::network(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        BackendError::network(format!("Connection failed: {e}"))
    } else {
        BackendError::unknown(format!("Request failed: {e}"))
    }
}

async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::network(format!("Failed to read response: {e}")))?;

    if !status.is_success() {
        return Err(classify_error(status, &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| BackendError::decode(format!("Failed to parse response: {e}")))
}

/// Classify a non-success response, extracting the backend's own message
/// when it sent one
fn classify_error(status: reqwest::StatusCode, body: &str) -> BackendError {
    let message = extract_error_message(body);
    match status.as_u16() {
        400 => BackendError::invalid_request(message),
        404 => BackendError::not_found(message),
        500..=599 => BackendError::server(message),
        _ => BackendError::unknown(message),
    }
}

/// Error bodies are JSON `{"error":{"message":...}}` when the service is
/// behaving, arbitrary text when it is not, empty when it is down hard
fn extract_error_message(body: &str) -> String {
    if body.is_empty() {
        return GENERIC_FAILURE.to_string();
    }
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
