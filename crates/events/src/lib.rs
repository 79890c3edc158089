//! Breeding lifecycle event fan-out.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`FarmEvent`]: envelope published after a lifecycle operation commits.
//!
//! Delivery (push, email, SMS) subscribes to the bus and lives elsewhere.

pub mod bus;

pub use bus::{EventBus, FarmEvent};
