//! HTTP client for the hosted backend.
//!
//! One client serves both planes. Data requests go to `/rest/v1/{table}`
//! with the project API key, plus the session's access token once a user
//! has signed in (row-level security decides what the token may touch).
//! Auth requests go to `/auth/v1/*`.
//!
//! The client holds the session tokens itself; callers observe session
//! state through [`current_session`](super::AuthGateway::current_session).

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use velvet_mango_core::{Email, OrderId, ProductId};

use crate::config::BackendConfig;

use super::types::{AuthUser, NewOrder, NewOrderItem, NewProduct, Order, Product};
use super::{AuthError, AuthGateway, BackendError, CatalogGateway, OrderGateway};

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the hosted backend's REST data plane and auth plane.
///
/// Cheaply cloneable via `Arc`; clones share the HTTP connection pool and
/// the session token state.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    http: reqwest::Client,
    /// Base URL without a trailing slash, e.g. `https://project.example.com`.
    base: String,
    api_key: String,
    session: RwLock<Option<SessionTokens>>,
}

/// Tokens returned by a password grant.
///
/// Only the access token is attached to requests; the refresh token is kept
/// so a future refresh flow has it available.
#[derive(Debug, Clone)]
struct SessionTokens {
    access_token: String,
    #[allow(dead_code)]
    refresh_token: Option<String>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let base = config.base_url.as_str().trim_end_matches('/').to_string();

        Self {
            inner: Arc::new(BackendClientInner {
                http: reqwest::Client::new(),
                base,
                api_key: config.api_key.expose_secret().to_string(),
                session: RwLock::new(None),
            }),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.inner.base)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.inner.base)
    }

    /// Bearer value for data-plane requests: the session's access token when
    /// signed in, the project API key otherwise.
    async fn bearer(&self) -> String {
        self.inner
            .session
            .read()
            .await
            .as_ref()
            .map_or_else(|| self.inner.api_key.clone(), |s| s.access_token.clone())
    }

    /// Attach headers, send, and map error statuses for the data plane.
    async fn send_data(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let bearer = self.bearer().await;
        let response = request
            .header("apikey", &self.inner.api_key)
            .bearer_auth(bearer)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(BackendError::Api {
                status: status.as_u16(),
                message: extract_data_error(&body),
            })
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Attach headers, send, and map error statuses for the auth plane.
    async fn send_auth(&self, request: RequestBuilder) -> Result<Response, AuthError> {
        let response = request.header("apikey", &self.inner.api_key).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(map_auth_error(status, &body))
        }
    }
}

// =============================================================================
// Auth plane
// =============================================================================

/// Successful password-grant response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

/// Error body shapes used by the auth plane, all fields optional because
/// older and newer endpoints disagree on names.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    error_code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

fn map_auth_error(status: StatusCode, body: &str) -> AuthError {
    let parsed: AuthErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.error_code.or(parsed.error).unwrap_or_default();
    let message = parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .unwrap_or_else(|| body.to_string());

    match code.as_str() {
        "invalid_credentials" | "invalid_grant" => AuthError::InvalidCredentials,
        "user_already_exists" | "email_exists" => AuthError::EmailTaken,
        "weak_password" => AuthError::WeakPassword(message),
        _ => AuthError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

impl AuthGateway for BackendClient {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &Email, password: &str) -> Result<(), AuthError> {
        self.send_auth(
            self.inner
                .http
                .post(self.auth_url("signup"))
                .json(&serde_json::json!({ "email": email, "password": password })),
        )
        .await?;

        debug!(%email, "Account created");
        Ok(())
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &Email, password: &str) -> Result<(), AuthError> {
        let response = self
            .send_auth(
                self.inner
                    .http
                    .post(self.auth_url("token"))
                    .query(&[("grant_type", "password")])
                    .json(&serde_json::json!({ "email": email, "password": password })),
            )
            .await?;

        let body = response.text().await?;
        let tokens: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Api {
                status: 200,
                message: format!("malformed token response: {e}"),
            })?;

        *self.inner.session.write().await = Some(SessionTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        });

        debug!(%email, "Signed in");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(tokens) = self.inner.session.read().await.clone() else {
            return Ok(());
        };

        let response = self
            .inner
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.inner.api_key)
            .bearer_auth(&tokens.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_auth_error(status, &body));
        }

        *self.inner.session.write().await = None;
        debug!("Signed out");
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthUser>, AuthError> {
        let Some(tokens) = self.inner.session.read().await.clone() else {
            return Ok(None);
        };

        let response = self
            .inner
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.inner.api_key)
            .bearer_auth(&tokens.access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Token expired or revoked server-side; the session is gone
            *self.inner.session.write().await = None;
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_auth_error(status, &body));
        }

        let body = response.text().await?;
        let user: AuthUser = serde_json::from_str(&body).map_err(|e| AuthError::Api {
            status: status.as_u16(),
            message: format!("malformed user response: {e}"),
        })?;

        Ok(Some(user))
    }
}

// =============================================================================
// Data plane
// =============================================================================

fn first_row<T>(rows: Vec<T>, table: &'static str) -> Result<T, BackendError> {
    rows.into_iter()
        .next()
        .ok_or(BackendError::MissingRow(table))
}

/// Pull the `message` field out of a data-plane error body, falling back to
/// the raw body.
fn extract_data_error(body: &str) -> String {
    #[derive(Deserialize)]
    struct DataErrorBody {
        message: String,
    }

    serde_json::from_str::<DataErrorBody>(body)
        .map_or_else(|_| body.to_string(), |parsed| parsed.message)
}

impl CatalogGateway for BackendClient {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let request = self
            .inner
            .http
            .get(self.rest_url("products"))
            .query(&[("select", "*")]);
        let response = self.send_data(request).await?;
        let products: Vec<Product> = Self::decode(response).await?;

        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn create_product(&self, product: &NewProduct) -> Result<Product, BackendError> {
        let request = self
            .inner
            .http
            .post(self.rest_url("products"))
            .header("Prefer", "return=representation")
            .json(&[product]);
        let response = self.send_data(request).await?;
        let rows: Vec<Product> = Self::decode(response).await?;

        first_row(rows, "products")
    }

    #[instrument(skip(self, product))]
    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, BackendError> {
        let request = self
            .inner
            .http
            .patch(self.rest_url("products"))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(product);
        let response = self.send_data(request).await?;
        let rows: Vec<Product> = Self::decode(response).await?;

        first_row(rows, "products")
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        let request = self
            .inner
            .http
            .delete(self.rest_url("products"))
            .query(&[("id", format!("eq.{id}"))]);
        self.send_data(request).await?;
        Ok(())
    }
}

impl OrderGateway for BackendClient {
    #[instrument(skip(self, order), fields(user_id = %order.user_id))]
    async fn create_order(&self, order: &NewOrder) -> Result<Order, BackendError> {
        let request = self
            .inner
            .http
            .post(self.rest_url("orders"))
            .header("Prefer", "return=representation")
            .json(&[order]);
        let response = self.send_data(request).await?;
        let rows: Vec<Order> = Self::decode(response).await?;

        first_row(rows, "orders")
    }

    async fn create_order_item(&self, item: &NewOrderItem) -> Result<(), BackendError> {
        let request = self
            .inner
            .http
            .post(self.rest_url("order_items"))
            .header("Prefer", "return=minimal")
            .json(&[item]);
        self.send_data(request).await?;
        Ok(())
    }

    async fn delete_order_items(&self, order_id: OrderId) -> Result<(), BackendError> {
        let request = self
            .inner
            .http
            .delete(self.rest_url("order_items"))
            .query(&[("order_id", format!("eq.{order_id}"))]);
        self.send_data(request).await?;
        Ok(())
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<(), BackendError> {
        let request = self
            .inner
            .http
            .delete(self.rest_url("orders"))
            .query(&[("id", format!("eq.{order_id}"))]);
        self.send_data(request).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_map_auth_error_invalid_grant() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert!(matches!(
            map_auth_error(StatusCode::BAD_REQUEST, body),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_map_auth_error_new_style_codes() {
        let body = r#"{"code":422,"error_code":"weak_password","msg":"Password should be at least 6 characters."}"#;
        match map_auth_error(StatusCode::UNPROCESSABLE_ENTITY, body) {
            AuthError::WeakPassword(msg) => {
                assert_eq!(msg, "Password should be at least 6 characters.");
            }
            other => panic!("expected WeakPassword, got {other:?}"),
        }

        let body = r#"{"code":422,"error_code":"user_already_exists","msg":"User already registered"}"#;
        assert!(matches!(
            map_auth_error(StatusCode::UNPROCESSABLE_ENTITY, body),
            AuthError::EmailTaken
        ));
    }

    #[test]
    fn test_map_auth_error_unknown_falls_through() {
        match map_auth_error(StatusCode::INTERNAL_SERVER_ERROR, "boom") {
            AuthError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_data_error() {
        let body = r#"{"code":"23505","message":"duplicate key value","details":null}"#;
        assert_eq!(extract_data_error(body), "duplicate key value");
        assert_eq!(extract_data_error("plain text"), "plain text");
    }

    #[test]
    fn test_first_row() {
        assert_eq!(first_row(vec![1, 2], "products").unwrap(), 1);
        assert!(matches!(
            first_row::<i32>(vec![], "orders"),
            Err(BackendError::MissingRow("orders"))
        ));
    }
}
