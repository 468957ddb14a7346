//! Core handler infrastructure.
//!
//! This module contains the handler trait, the per-command handler table,
//! the context passed to handlers and the dispatcher that routes a
//! resolution to its handler.

pub mod context;
pub mod dispatch;
pub mod traits;

pub use context::Context;
pub use dispatch::{Dispatched, Dispatcher};
pub use traits::{Handler, HandlerSet};
