//! PING command handler.
//!
//! `/ping`
//!
//! Replies so users can check the bot is alive.

use super::{Command, CommandResult, Context};
use async_trait::async_trait;

/// Handler for the ping command.
pub struct PingCommand;

#[async_trait]
impl Command for PingCommand {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Check that the bot is responding"
    }

    async fn execute(&self, ctx: &Context) -> CommandResult {
        ctx.reply("Pong!").await;
        Ok(())
    }
}
