//! cmdagent - chat command agent.
//!
//! Resolves free-text messages from any chat surface into one well-defined
//! outcome (command run, parameter problem, restriction denial, not
//! understood) and dispatches it to the matched command's handler, with many
//! messages in flight at once.
//!
//! - [`command`]: command tree, parameters, restrictions, registry
//! - [`resolve`]: the recursive resolver and its outcome model
//! - [`handlers`]: handler trait, dispatcher, help and common handlers
//! - [`pipeline`]: bounded queue and worker pool
//! - [`io`]: input/output contracts and bundled adapters

pub mod command;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod resolve;
pub mod telemetry;

pub use command::{Command, CommandRegistry, Parameter, PatternType, Restriction};
pub use error::{OutputError, PipelineError, RegistryError, ResolveError};
pub use handlers::{Context, Handler};
pub use io::{Input, InputEntry, Output, Outputs};
pub use pipeline::{Agent, Ingress, ListenReport, PipelineEvent, ShutdownHandle};
pub use resolve::{OutcomeKind, Resolution, resolve};
