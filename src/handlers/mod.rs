//! Bot command handlers.
//!
//! This module contains the command contract, the registry and dispatcher
//! (in [`core`]), and the builtin commands every bot instance registers.

pub mod core;
mod ping;
mod rules;
mod stats;

pub use self::core::{
    Caller, Command, CommandSchema, Context, Dispatcher, Handler, Interaction,
    InteractionResponse, Middleware, OptionValue, ParameterKind, ParameterSpec, Registry,
};
pub use crate::error::{CommandError, CommandResult};
pub use ping::PingCommand;
pub use rules::{MANAGE_GUILD, RulesCommand, SetRuleCommand};
pub use stats::StatsCommand;

use std::sync::Arc;

/// Commands registered on every bot.
pub fn builtin_commands() -> Vec<Arc<dyn Command>> {
    vec![
        Arc::new(PingCommand),
        Arc::new(StatsCommand),
        Arc::new(RulesCommand),
        Arc::new(SetRuleCommand),
    ]
}
