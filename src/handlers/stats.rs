//! STATS command handler.
//!
//! `/stats`
//!
//! Returns uptime and usage counters of the bot, plus the most used
//! commands once any have run.

use super::{Command, CommandError, CommandResult, Context};
use async_trait::async_trait;

/// Commands listed in the usage line.
const TOP_COMMANDS: usize = 5;

/// Handler for the stats command.
pub struct StatsCommand;

#[async_trait]
impl Command for StatsCommand {
    fn name(&self) -> &str {
        "stats"
    }

    fn description(&self) -> &str {
        "Show bot uptime and usage statistics"
    }

    async fn execute(&self, ctx: &Context) -> CommandResult {
        let stats = ctx
            .info()
            .stats()
            .ok_or_else(|| CommandError::Internal("stats unavailable".to_string()))?;

        ctx.reply(format!("Uptime: {}", stats.uptime)).await;
        ctx.reply(format!("Commands executed: {}", stats.commands_executed)).await;
        ctx.reply(format!("Guilds: {}", stats.guild_count)).await;
        ctx.reply(format!("Active rules: {}", stats.active_rules)).await;

        let usage = ctx.info().command_usage();
        if !usage.is_empty() {
            let top: Vec<String> = usage
                .iter()
                .take(TOP_COMMANDS)
                .map(|(name, count)| format!("{name} ({count})"))
                .collect();
            ctx.reply(format!("Most used: {}", top.join(", "))).await;
        }
        Ok(())
    }
}
