//! API client for the MesFactures backend.
//!
//! Wraps the REST endpoints the application consumes: authentication,
//! invoice and goal creation, plus the per-collection routes used to replay
//! the sync queue.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use mesfactures_core::goals::NewGoal;
use mesfactures_core::invoices::ParsedInvoice;

use crate::error::{ConnectError, Result};
use crate::types::*;

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the backend REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The API root, e.g. "http://localhost:5000/api"
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Create headers for an API request.
    fn headers(&self, token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ConnectError::auth("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder> {
        Ok(self
            .client
            .request(method, self.url(path))
            .headers(self.headers(token)?))
    }

    /// Turns a non-2xx response into [`ConnectError::Api`].
    pub(crate) async fn check_status(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        debug!("API response ({}): {}", status, body);

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.text().map(str::to_string))
                .unwrap_or_else(|| format!("Request failed: {}", body));
            return Err(ConnectError::api(status.as_u16(), message));
        }
        Ok(body)
    }

    /// Parse a JSON response body.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = Self::check_status(response).await?;
        serde_json::from_str(&body).map_err(|e| {
            log::error!("Failed to deserialize response. Body: {}, Error: {}", body, e);
            ConnectError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T> {
        let response = self
            .request(Method::POST, path, token)?
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────────

    /// POST /auth/login
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("auth/login", None, &request).await
    }

    /// POST /auth/register
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        self.post("auth/register", None, request).await
    }

    /// POST /auth/verify-token
    ///
    /// A token rejected by the backend yields `Ok` with `success == false`.
    pub async fn verify_token(&self, token: &str) -> Result<VerifyTokenResponse> {
        match self
            .post("auth/verify-token", Some(token), &VerifyTokenRequest { token })
            .await
        {
            Err(e) if e.is_unauthorized() => Ok(VerifyTokenResponse {
                success: false,
                user: None,
                message: Some(e.to_string()),
            }),
            other => other,
        }
    }

    /// POST /auth/change-password
    pub async fn change_password(
        &self,
        token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<MessageResponse> {
        if request.new_password != request.confirm_password {
            return Err(ConnectError::invalid_request(
                "New password and confirmation differ",
            ));
        }
        self.post("auth/change-password", Some(token), request).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Invoices and goals
    // ─────────────────────────────────────────────────────────────────────────

    /// POST /factures/factures
    pub async fn create_invoice(
        &self,
        token: &str,
        user_id: i64,
        invoice: &ParsedInvoice,
    ) -> Result<Value> {
        let body = InvoiceUpload {
            utilisateur_id: user_id,
            invoice,
        };
        self.post("factures/factures", Some(token), &body).await
    }

    /// POST /objectifs/objectifs
    pub async fn create_goal(&self, token: &str, user_id: i64, goal: &NewGoal) -> Result<Value> {
        let body = GoalUpload {
            utilisateur_id: user_id,
            goal,
        };
        self.post("objectifs/objectifs", Some(token), &body).await
    }

    /// GET /objectifs/objectifs
    pub async fn list_goals(&self, token: Option<&str>) -> Result<Vec<Value>> {
        let response = self
            .request(Method::GET, "objectifs/objectifs", token)?
            .send()
            .await?;
        let envelope: ApiResponse<Vec<Value>> = Self::parse_response(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }
}
