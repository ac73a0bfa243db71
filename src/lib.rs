//! modbot - moderation chat bot.
//!
//! A command dispatch core (registry, middleware chain, dispatcher) driven by
//! a chat session, plus a loopback HTTP control API exposing stats and rules.

pub mod bot;
pub mod config;
pub mod control;
pub mod error;
pub mod handlers;
pub mod session;
pub mod state;
pub mod telemetry;

pub use bot::Bot;
