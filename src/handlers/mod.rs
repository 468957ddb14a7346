//! Command handlers.
//!
//! Commands carry their own handlers, one per outcome kind. The [`common`]
//! handlers cover the user-facing replies for outcomes that are about the
//! input rather than the command (bad parameters, restrictions, leftover
//! text), so commands only need to implement their happy path.

pub mod common;
pub mod core;
pub mod help;

pub use self::core::{Context, Dispatched, Dispatcher, Handler, HandlerSet};
pub use common::{
    CommonHandlers, ErrorHandler, ExtraParamsHandler, MissingParamsHandler, RESTRICTED_MESSAGE,
    RestrictedHandler, WrongTypeHandler,
};
pub use help::render_help;
