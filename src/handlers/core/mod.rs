//! Core handler infrastructure.
//!
//! This module contains the command contract, the registry that stores
//! commands, the middleware chain wrapped around every invocation, and the
//! dispatcher that ties them together.
//!
//! ## Flow
//!
//! ```text
//! Session ──Interaction──▶ Dispatcher ──Context──▶ mw[0] ▶ … ▶ mw[n-1] ▶ Command::execute
//! ```
//!
//! The chain is composed once when the [`Dispatcher`] is built.

pub mod context;
pub mod dispatcher;
pub mod middleware;
pub mod registry;
pub mod traits;

pub use context::{Caller, Context, Interaction, OptionValue, ReplyBuffer};
pub use dispatcher::{Dispatcher, InteractionResponse};
pub use middleware::{Handler, HandlerFuture, Middleware, chain, execute, handler, middleware};
pub use registry::Registry;
pub use traits::{Command, CommandSchema, ParameterKind, ParameterSpec};
