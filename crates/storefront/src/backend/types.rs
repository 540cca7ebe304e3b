//! Wire records exchanged with the hosted backend.
//!
//! Field names match the backing table columns, so every type round-trips
//! through the REST plane without rename attributes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use velvet_mango_core::{Email, OrderId, OrderStatus, Price, ProductId, UserId};

// =============================================================================
// Auth Types
// =============================================================================

/// Identity behind an authenticated session.
///
/// The auth plane guarantees an id; the email can be absent for accounts
/// created through other channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Account id assigned by the auth plane.
    pub id: UserId,
    /// Account email, when known.
    pub email: Option<Email>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A catalog product as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id assigned by the backend.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Product image URL, when one has been uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Free-text category label (e.g. "tshirts", "hoodies").
    pub category: String,
    /// Units in stock; zero renders as out-of-stock.
    pub stock: u32,
    /// Row creation time, assigned by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Input shape for inserting or replacing a product.
///
/// Updates send the full field set, mirroring the admin form; there is no
/// partial patch shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Product image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Free-text category label.
    pub category: String,
    /// Units in stock.
    pub stock: u32,
}

// =============================================================================
// Order Types
// =============================================================================

/// An order header as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order id assigned by the backend.
    pub id: OrderId,
    /// Account that placed the order.
    pub user_id: UserId,
    /// Cart total captured at placement time.
    pub total_price: Price,
    /// Contact email from the checkout form.
    pub customer_email: Email,
    /// Contact phone from the checkout form.
    pub customer_phone: String,
    /// Single concatenated shipping line: "street, city postal".
    pub shipping_address: String,
    /// Order lifecycle status; checkout inserts `pending`.
    pub status: OrderStatus,
    /// Row creation time, assigned by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Input shape for inserting an order header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Account placing the order.
    pub user_id: UserId,
    /// Cart total at placement time.
    pub total_price: Price,
    /// Contact email from the checkout form.
    pub customer_email: Email,
    /// Contact phone from the checkout form.
    pub customer_phone: String,
    /// Single concatenated shipping line.
    pub shipping_address: String,
    /// Initial lifecycle status.
    pub status: OrderStatus,
}

/// Input shape for inserting one order line item.
///
/// `price` is the unit price captured at order time; it is never re-read
/// from the product later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    /// Order this line belongs to.
    pub order_id: OrderId,
    /// Product ordered.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: u32,
    /// Unit price at order time.
    pub price: Price,
}
