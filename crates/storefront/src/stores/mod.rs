//! Process-local state stores.
//!
//! Each store owns its state behind a `tokio::sync::watch` channel:
//! mutations apply synchronously (any derived value recomputed after a call
//! returns sees the new state) and subscribers get change notification for
//! free. Stores are constructed once at application start and passed down
//! explicitly; nothing here is a process-wide singleton.

pub mod cart;
pub mod session;

pub use cart::{CartItem, CartStore};
pub use session::{SessionState, SessionStore};
