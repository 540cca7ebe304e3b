//! Velvet Mango Core - Shared types library.
//!
//! This crate provides common types used across all Velvet Mango components:
//! - `storefront` - The client core (stores, navigation, backend gateways)
//! - `cli` - Command-line catalog management tools
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no runtime.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
