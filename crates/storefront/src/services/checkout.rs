//! Checkout order placement.
//!
//! Placing an order is a multi-record write against a REST surface with no
//! transaction primitive: one order header plus one row per cart line.
//! The first failed line insert aborts the rest and unwinds what was
//! already written (line items, then the header) so a half-placed order is
//! not left behind.

use thiserror::Error;
use tracing::{info, instrument, warn};

use velvet_mango_core::{Email, OrderId, OrderStatus};

use crate::backend::{BackendError, NewOrder, NewOrderItem, OrderGateway};
use crate::stores::{CartStore, SessionState};

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines. Checked before any remote call.
    #[error("cart is empty")]
    EmptyCart,

    /// No authenticated identity. Checked before any remote call.
    #[error("sign in to place an order")]
    NotSignedIn,

    /// The remote store rejected a write.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Shipping details collected by the checkout form.
///
/// Field-level validation (formats, required fields) happens in the form;
/// this type only carries the values.
#[derive(Debug, Clone)]
pub struct ShippingDetails {
    /// Contact email; prefilled from the session but the form value wins.
    pub email: Email,
    /// Contact phone.
    pub phone: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
}

impl ShippingDetails {
    /// The single concatenated line stored on the order record.
    #[must_use]
    pub fn address_line(&self) -> String {
        format!("{}, {} {}", self.address, self.city, self.postal_code)
    }
}

/// Order placement over an [`OrderGateway`].
pub struct CheckoutService<O> {
    orders: O,
}

impl<O: OrderGateway> CheckoutService<O> {
    /// Create a checkout service over a gateway.
    #[must_use]
    pub const fn new(orders: O) -> Self {
        Self { orders }
    }

    /// Place an order for the current cart.
    ///
    /// Preconditions are checked before any remote call: an authenticated
    /// session and a non-empty cart. The order header is inserted first
    /// with the cart total and `pending` status, then one line per cart
    /// item carrying the unit price captured when the line was added. On
    /// success the cart is cleared and the order id returned.
    ///
    /// The first failed line insert aborts the remaining inserts and
    /// unwinds the records already written; the cart is left intact so the
    /// user can retry.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotSignedIn`] or [`CheckoutError::EmptyCart`]
    /// when a precondition fails, and [`CheckoutError::Backend`] when the
    /// remote store rejects a write.
    #[instrument(skip(self, cart, session, shipping))]
    pub async fn place_order(
        &self,
        cart: &CartStore,
        session: &SessionState,
        shipping: &ShippingDetails,
    ) -> Result<OrderId, CheckoutError> {
        let user = session.user.as_ref().ok_or(CheckoutError::NotSignedIn)?;

        let items = cart.items();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let order = self
            .orders
            .create_order(&NewOrder {
                user_id: user.id,
                total_price: cart.total(),
                customer_email: shipping.email.clone(),
                customer_phone: shipping.phone.clone(),
                shipping_address: shipping.address_line(),
                status: OrderStatus::Pending,
            })
            .await?;

        for item in &items {
            if let Err(err) = self
                .orders
                .create_order_item(&NewOrderItem {
                    order_id: order.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                })
                .await
            {
                self.unwind(order.id).await;
                return Err(err.into());
            }
        }

        cart.clear();
        info!(order_id = %order.id, lines = items.len(), "Order placed");
        Ok(order.id)
    }

    /// Delete the records of a partially written order: line items first,
    /// then the header. Failures here are reported but not propagated; the
    /// original insert error is what the caller sees.
    async fn unwind(&self, order_id: OrderId) {
        if let Err(err) = self.orders.delete_order_items(order_id).await {
            warn!(order_id = %order_id, error = %err, "Failed to unwind order items");
            sentry::capture_error(&err);
            // The header must stay while its items might: deleting it
            // first would orphan them
            return;
        }

        if let Err(err) = self.orders.delete_order(order_id).await {
            warn!(order_id = %order_id, error = %err, "Failed to unwind order header");
            sentry::capture_error(&err);
        }
    }
}
