//! Velvet Mango Storefront - headless client core.
//!
//! This crate is the state-management heart of the storefront: the shopping
//! cart, the authenticated session, the page navigation with auth gating,
//! and the services that talk to the hosted backend.
//!
//! # Architecture
//!
//! - [`stores`] - Process-local state (cart, session) over `tokio::sync::watch`
//! - [`nav`] - Page selection and auth gating, fed by a typed request channel
//! - [`backend`] - Gateway traits plus the HTTP client for the hosted
//!   backend's REST data plane and token auth plane
//! - [`services`] - Catalog browsing/administration and checkout placement
//! - [`config`] / [`telemetry`] - Environment configuration, tracing, Sentry
//!
//! There is no server in this crate. A front end (or the `vm-cli` binary)
//! constructs the stores and services once at startup and drives them from
//! its event loop; everything is dependency-injected, nothing is a process
//! global.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod nav;
pub mod services;
pub mod stores;
pub mod telemetry;
