//! Application services composed from the stores and gateways.

pub mod catalog;
pub mod checkout;

pub use catalog::CatalogService;
pub use checkout::{CheckoutError, CheckoutService, ShippingDetails};
