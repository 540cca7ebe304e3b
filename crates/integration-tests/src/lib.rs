//! Integration tests for Velvet Mango.
//!
//! The storefront core is generic over its backend gateways, so these tests
//! drive the real stores, navigation, and services against [`FakeBackend`],
//! an in-memory stand-in for the hosted service's data and auth planes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p velvet-mango-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_flow` - Browse, cart, gated checkout end to end
//! - `checkout_compensation` - Partial-write unwinding
//! - `session_lifecycle` - Account and session state transitions

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;

use velvet_mango_core::{Email, OrderId, Price, ProductId, UserId};
use velvet_mango_storefront::backend::{
    AuthError, AuthGateway, AuthUser, BackendError, CatalogGateway, NewOrder, NewOrderItem,
    NewProduct, Order, OrderGateway, Product,
};

/// In-memory hosted backend: product/order tables plus password accounts.
///
/// Clones share state, like clones of the HTTP client share a session.
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<FakeBackendInner>>,
}

#[derive(Default)]
pub struct FakeBackendInner {
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub order_items: Vec<NewOrderItem>,
    /// email -> (user id, password)
    accounts: HashMap<String, (UserId, String)>,
    active_session: Option<AuthUser>,
    /// Fail the nth order-item insert (0-based) when set.
    pub fail_item_at: Option<usize>,
    /// Count of order-item insert attempts, including the failed one.
    pub item_attempts: usize,
    /// Fail every session check when set.
    pub fail_session_check: bool,
}

impl FakeBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the backing state for seeding or inspection.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    pub fn state(&self) -> MutexGuard<'_, FakeBackendInner> {
        self.inner.lock().unwrap()
    }

    /// Seed a product and return its record.
    pub fn seed_product(&self, name: &str, price: i64, category: &str, stock: u32) -> Product {
        let product = Product {
            id: ProductId::generate(),
            name: name.to_string(),
            description: format!("{name} description"),
            price: Price::new(Decimal::from(price)),
            image_url: None,
            category: category.to_string(),
            stock,
            created_at: None,
        };
        self.state().products.push(product.clone());
        product
    }

    /// Seed a password account and return its user id.
    pub fn seed_account(&self, email: &str, password: &str) -> UserId {
        let id = UserId::generate();
        self.state()
            .accounts
            .insert(email.to_string(), (id, password.to_string()));
        id
    }

    /// Establish an active session directly, as if a prior process had
    /// signed in.
    ///
    /// # Panics
    ///
    /// Panics if no account was seeded for `email`.
    pub fn seed_session(&self, email: &str) {
        let mut state = self.state();
        let id = state
            .accounts
            .get(email)
            .map(|(id, _)| *id)
            .unwrap_or_else(|| panic!("no seeded account for {email}"));
        state.active_session = Some(AuthUser {
            id,
            email: Some(Email::parse(email).unwrap()),
        });
    }
}

fn data_rejected(message: &str) -> BackendError {
    BackendError::Api {
        status: 500,
        message: message.to_string(),
    }
}

impl AuthGateway for FakeBackend {
    async fn sign_up(&self, email: &Email, password: &str) -> Result<(), AuthError> {
        let mut state = self.state();
        if state.accounts.contains_key(email.as_str()) {
            return Err(AuthError::EmailTaken);
        }
        state
            .accounts
            .insert(email.as_str().to_string(), (UserId::generate(), password.to_string()));
        Ok(())
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<(), AuthError> {
        let mut state = self.state();
        let Some((id, stored)) = state.accounts.get(email.as_str()).cloned() else {
            return Err(AuthError::InvalidCredentials);
        };
        if stored != password {
            return Err(AuthError::InvalidCredentials);
        }

        state.active_session = Some(AuthUser {
            id,
            email: Some(email.clone()),
        });
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.state().active_session = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthUser>, AuthError> {
        let state = self.state();
        if state.fail_session_check {
            return Err(AuthError::Api {
                status: 503,
                message: "auth plane unavailable".to_string(),
            });
        }
        Ok(state.active_session.clone())
    }
}

impl CatalogGateway for FakeBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        Ok(self.state().products.clone())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, BackendError> {
        let created = Product {
            id: ProductId::generate(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            category: product.category.clone(),
            stock: product.stock,
            created_at: None,
        };
        self.state().products.push(created.clone());
        Ok(created)
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, BackendError> {
        let mut state = self.state();
        let row = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(BackendError::MissingRow("products"))?;

        row.name.clone_from(&product.name);
        row.description.clone_from(&product.description);
        row.price = product.price;
        row.image_url.clone_from(&product.image_url);
        row.category.clone_from(&product.category);
        row.stock = product.stock;
        Ok(row.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        self.state().products.retain(|p| p.id != id);
        Ok(())
    }
}

impl OrderGateway for FakeBackend {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, BackendError> {
        let created = Order {
            id: OrderId::generate(),
            user_id: order.user_id,
            total_price: order.total_price,
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            shipping_address: order.shipping_address.clone(),
            status: order.status,
            created_at: None,
        };
        self.state().orders.push(created.clone());
        Ok(created)
    }

    async fn create_order_item(&self, item: &NewOrderItem) -> Result<(), BackendError> {
        let mut state = self.state();
        let attempt = state.item_attempts;
        state.item_attempts += 1;

        if state.fail_item_at == Some(attempt) {
            return Err(data_rejected("order item insert rejected"));
        }

        state.order_items.push(item.clone());
        Ok(())
    }

    async fn delete_order_items(&self, order_id: OrderId) -> Result<(), BackendError> {
        self.state().order_items.retain(|i| i.order_id != order_id);
        Ok(())
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<(), BackendError> {
        self.state().orders.retain(|o| o.id != order_id);
        Ok(())
    }
}
