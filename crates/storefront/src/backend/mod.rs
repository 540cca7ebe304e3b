//! Hosted backend gateways.
//!
//! # Architecture
//!
//! The hosted backend-as-a-service exposes two planes:
//!
//! - a REST data plane (`/rest/v1/{table}`) for querying and mutating
//!   product, order, and order-item records
//! - a token auth plane (`/auth/v1/*`) for account and session operations
//!
//! The stores and services never speak HTTP themselves. They are generic
//! over the gateway traits in this module ([`AuthGateway`],
//! [`CatalogGateway`], [`OrderGateway`]), and [`BackendClient`] is the one
//! production implementation of all three. Tests substitute in-memory fakes.
//!
//! # Example
//!
//! ```rust,ignore
//! use velvet_mango_storefront::backend::{BackendClient, CatalogGateway};
//!
//! let client = BackendClient::new(&config.backend);
//! let products = client.list_products().await?;
//! ```

mod client;
pub mod types;

pub use client::BackendClient;
pub use types::*;

use thiserror::Error;

use velvet_mango_core::{Email, OrderId, ProductId};

/// Errors from the backend's REST data plane.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request with an error status.
    #[error("backend rejected request ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, or the raw body.
        message: String,
    },

    /// JSON parsing of a response body failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A write that asked for the stored representation got no rows back.
    #[error("backend returned no rows for {0}")]
    MissingRow(&'static str),
}

/// Errors from the backend's auth plane.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format (rejected before any network call).
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] velvet_mango_core::EmailError),

    /// Wrong email/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// Password rejected as too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other rejection from the auth plane.
    #[error("auth service rejected request ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, or the raw body.
        message: String,
    },
}

/// Remote auth interface: account and session operations.
///
/// Successful `sign_in` establishes a session held by the gateway itself
/// (token state is the gateway's concern); local session state is refreshed
/// separately via [`current_session`](Self::current_session).
#[allow(async_fn_in_trait)]
pub trait AuthGateway {
    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] or [`AuthError::WeakPassword`] when
    /// the auth plane rejects the registration.
    async fn sign_up(&self, email: &Email, password: &str) -> Result<(), AuthError>;

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for a wrong combination.
    async fn sign_in(&self, email: &Email, password: &str) -> Result<(), AuthError>;

    /// Invalidate the current session. A no-op when none is held.
    ///
    /// # Errors
    ///
    /// Returns an error if the auth plane rejects the revocation; the
    /// session is left in place in that case.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Fetch the identity behind the currently held session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport or unexpected auth-plane
    /// failures; an absent or expired session is `Ok(None)`.
    async fn current_session(&self) -> Result<Option<AuthUser>, AuthError>;
}

/// Remote data interface over the product catalog.
#[allow(async_fn_in_trait)]
pub trait CatalogGateway {
    /// Fetch all products.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the read is rejected.
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// Insert a product and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the write is rejected.
    async fn create_product(&self, product: &NewProduct) -> Result<Product, BackendError>;

    /// Replace a product's fields and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the write is rejected or the id matches
    /// no row.
    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, BackendError>;

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the delete is rejected.
    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError>;
}

/// Remote data interface over orders and their line items.
///
/// The delete operations exist for checkout compensation: there is no
/// transaction primitive on the REST surface, so a failed multi-record
/// write is unwound record by record.
#[allow(async_fn_in_trait)]
pub trait OrderGateway {
    /// Insert an order header and return the stored record with its
    /// assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the write is rejected.
    async fn create_order(&self, order: &NewOrder) -> Result<Order, BackendError>;

    /// Insert one order line item.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the write is rejected.
    async fn create_order_item(&self, item: &NewOrderItem) -> Result<(), BackendError>;

    /// Delete all line items of an order.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the delete is rejected.
    async fn delete_order_items(&self, order_id: OrderId) -> Result<(), BackendError>;

    /// Delete an order header.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the delete is rejected.
    async fn delete_order(&self, order_id: OrderId) -> Result<(), BackendError>;
}
