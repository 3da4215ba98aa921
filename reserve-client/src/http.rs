//! HTTP client for network-based API calls

use crate::{ApiResponse, BookingApi, ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::time_format::format_time;
use shared::{BookingConfirmation, BookingRequest, MenuItem, Room};

/// HTTP client for making network requests to the booking API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
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
        let mut request = self.client.get(self.url(path));

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut request = self.client.post(self.url(path)).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response and unwrap the `ApiResponse` envelope
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            let message = envelope_message(&text).unwrap_or(text);
            tracing::debug!(status = %status, message = %message, "Booking API request failed");
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(message)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                StatusCode::CONFLICT => Err(ClientError::Conflict(message)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(message))
                }
                _ => Err(ClientError::Internal(message)),
            };
        }

        let envelope: ApiResponse<T> = response.json().await?;
        if !envelope.is_success() {
            return Err(ClientError::Api {
                code: envelope.code,
                message: envelope.message,
            });
        }
        envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing response data".to_string()))
    }
}

/// Pull `message` out of an error body if it is an `ApiResponse` envelope
fn envelope_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .map(|e| e.message)
}

fn rooms_path(date: Option<NaiveDate>, time: Option<NaiveTime>) -> String {
    let mut params = Vec::new();
    if let Some(date) = date {
        params.push(format!("date={}", date.format("%Y-%m-%d")));
    }
    if let Some(time) = time {
        params.push(format!("time={}", format_time(&time)));
    }
    if params.is_empty() {
        "/api/rooms".to_string()
    } else {
        format!("/api/rooms?{}", params.join("&"))
    }
}

#[async_trait]
impl BookingApi for HttpClient {
    async fn fetch_menu_items(&self) -> ClientResult<Vec<MenuItem>> {
        self.get("/api/menu-items").await
    }

    async fn fetch_rooms(
        &self,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> ClientResult<Vec<Room>> {
        self.get(&rooms_path(date, time)).await
    }

    async fn create_booking(&self, request: &BookingRequest) -> ClientResult<BookingConfirmation> {
        tracing::debug!(
            client_request_id = %request.client_request_id,
            items = request.items.as_ref().map_or(0, Vec::len),
            "POST /api/bookings"
        );
        self.post("/api/bookings", request).await
    }
}
