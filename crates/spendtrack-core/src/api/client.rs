//! API client for communicating with the expense backend.
//!
//! This module provides the `ApiClient` struct for authentication and for
//! the settings, category, icon, transaction, and limit endpoints.

use chrono::NaiveDate;
use reqwest::{header, Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{
    Category, Icon, NewCategory, NewTransaction, PredefinedLimit, SettingsSnapshot, Transaction,
};
use crate::settings::SettingsUpdate;

use super::{ApiError, ApiResult};

// ============================================================================
// Constants
// ============================================================================

const USER_AGENT: &str = concat!("spendtrack/", env!("CARGO_PKG_VERSION"));

/// Message shown for any rejected login, whatever the backend said
const LOGIN_FAILED: &str = "Login failed";

/// Fallback when a rejected registration carries no `error` field
const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct RegisterErrorResponse {
    error: Option<String>,
}

/// Body of a successful `PUT /settings/{field}`.
/// Any JSON value is accepted; only a `newToken` string is looked at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdateResponse {
    body: Value,
}

impl SettingsUpdateResponse {
    pub fn from_body(body: Value) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Replacement token issued when the change invalidates the old one.
    /// Empty strings and non-string values count as no rotation.
    pub fn rotated_token(&self) -> Option<&str> {
        self.body
            .get("newToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    }
}

/// API client for the expense backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    /// Used to scope a token to a single request.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> ApiResult<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidToken)?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> ApiResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, url: &str) -> ApiResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> ApiResult<T> {
        let response = self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, url).await
    }

    // ===== Authentication =====

    /// Exchange username and password for a token.
    /// The backend answers with the raw token as the response body.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<String> {
        let url = self.url("/auth/login");
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %body, "Login rejected");
            return Err(ApiError::Rejected {
                status,
                body: LOGIN_FAILED.to_string(),
            });
        }

        let token = response.text().await?;
        let token = token.trim().trim_matches('"').to_string();
        if token.is_empty() {
            return Err(ApiError::InvalidResponse("Login returned an empty token".to_string()));
        }
        Ok(token)
    }

    /// Create an account and return its first token
    pub async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<String> {
        let url = self.url("/auth/register");
        let response = self
            .client
            .post(&url)
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RegisterErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| REGISTRATION_FAILED.to_string());
            return Err(ApiError::Rejected { status, body: message });
        }

        let parsed: RegisterResponse = Self::parse_json(response, &url).await?;
        Ok(parsed.token)
    }

    // ===== Settings =====

    /// Fetch username, email and primary currency
    pub async fn fetch_settings(&self) -> ApiResult<SettingsSnapshot> {
        self.get(&self.url("/settings/populate")).await
    }

    /// Apply one settings change. Rejections keep the backend's body text
    /// unmodified so it can be shown to the user as-is.
    pub async fn update_setting(&self, update: &SettingsUpdate) -> ApiResult<SettingsUpdateResponse> {
        let url = self.url(&format!("/settings/{}", update.field().as_str()));
        let response = self
            .client
            .put(&url)
            .headers(self.auth_headers()?)
            .json(&update.request_body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, field = update.field().as_str(), "Settings update rejected");
            return Err(ApiError::Rejected { status, body });
        }

        let body: Value = Self::parse_json(response, &url).await?;
        Ok(SettingsUpdateResponse::from_body(body))
    }

    // ===== Categories =====

    pub async fn fetch_categories(&self) -> ApiResult<Vec<Category>> {
        self.get(&self.url("/categories")).await
    }

    pub async fn create_category(&self, category: &NewCategory) -> ApiResult<Category> {
        let created: Category = self.post(&self.url("/categories"), category).await?;
        debug!(id = created.id, name = %created.name, "Category created");
        Ok(created)
    }

    /// Fetch the icon choices for categories, names in kebab-case
    pub async fn fetch_icons(&self) -> ApiResult<Vec<Icon>> {
        let icons: Vec<Icon> = self.get(&self.url("/icons/predefined")).await?;
        Ok(icons.into_iter().map(Icon::normalized).collect())
    }

    // ===== Transactions =====

    pub async fn create_transaction(
        &self,
        category_id: i64,
        transaction: &NewTransaction,
    ) -> ApiResult<Transaction> {
        let url = self.url(&format!("/transaction/category/{}", category_id));
        let created: Transaction = self.post(&url, transaction).await?;
        debug!(category_id, amount = created.amount, "Transaction created");
        Ok(created)
    }

    /// Fetch transactions dated within `start..=end`
    pub async fn fetch_transactions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<Vec<Transaction>> {
        let url = self.url("/transaction/date-range");
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .query(&[("startDate", start.to_string()), ("endDate", end.to_string())])
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, &url).await
    }

    // ===== Limits =====

    pub async fn fetch_predefined_limits(&self) -> ApiResult<Vec<PredefinedLimit>> {
        self.get(&self.url("/predefined-limits")).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.url("/categories"), "http://localhost:8080/api/categories");
    }

    #[test]
    fn test_auth_headers() {
        let client = ApiClient::new("http://localhost").unwrap();
        assert!(client.auth_headers().unwrap().is_empty());

        let headers = client.with_token("abc".to_string()).auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer abc");

        assert!(matches!(
            client.with_token("bad\ntoken".to_string()).auth_headers(),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn test_rotated_token_ignores_empty() {
        let parsed = SettingsUpdateResponse::from_body(json!({"newToken": ""}));
        assert!(parsed.rotated_token().is_none());

        let parsed = SettingsUpdateResponse::from_body(json!({"message": "ok", "newToken": "T2"}));
        assert_eq!(parsed.rotated_token(), Some("T2"));

        assert!(SettingsUpdateResponse::from_body(json!({})).rotated_token().is_none());
    }

    #[test]
    fn test_rotated_token_from_loose_bodies() {
        let parsed = SettingsUpdateResponse::from_body(json!("Username updated"));
        assert!(parsed.rotated_token().is_none());

        let parsed = SettingsUpdateResponse::from_body(json!({"message": {"text": "ok"}, "newToken": null}));
        assert!(parsed.rotated_token().is_none());

        let parsed = SettingsUpdateResponse::from_body(json!({"message": {"text": "ok"}, "newToken": "T3"}));
        assert_eq!(parsed.rotated_token(), Some("T3"));

        let parsed = SettingsUpdateResponse::from_body(json!({"newToken": 7}));
        assert!(parsed.rotated_token().is_none());
    }
}
