//! Unread-marker, read-state and pagination-boundary engine for the report
//! conversation view.
//!
//! The engine is a set of pure computations (`view::visibility`,
//! `view::offline`, `view::unread_marker`) driven by two small state machines
//! (`view::read_state`, `view::pagination`) and wired together per open
//! conversation by `view::ConversationView`.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod models;
pub mod subscriptions;
pub mod tracing_setup;
pub mod view;

// Re-export the host-facing types at crate root for convenience
pub use config::EngineConfig;
pub use error::{LedgerChatError, Result};
pub use events::{LiveEvent, ViewCommand};
pub use subscriptions::{Subscription, SubscriptionRegistry};
pub use view::{ConversationView, ViewSnapshot};
