//! Rule commands: RULES and SETRULE.
//!
//! `/rules`
//! `/setrule name=<rule> key=<key> [value=<value>]`

use super::{Command, CommandResult, Context, ParameterKind, ParameterSpec};
use async_trait::async_trait;
use tracing::info;

/// Manage-guild permission bit, required to change rules.
pub const MANAGE_GUILD: u64 = 1 << 5;

/// Handler for the rules command.
///
/// Lists every moderation rule with its state and configuration.
pub struct RulesCommand;

#[async_trait]
impl Command for RulesCommand {
    fn name(&self) -> &str {
        "rules"
    }

    fn description(&self) -> &str {
        "List moderation rules"
    }

    async fn execute(&self, ctx: &Context) -> CommandResult {
        let rules = ctx.info().rules().unwrap_or_default();
        if rules.is_empty() {
            ctx.reply("No rules configured.").await;
            return Ok(());
        }

        for rule in rules {
            let state = if rule.enabled { "on" } else { "off" };
            let slot = if rule.key.is_empty() {
                String::new()
            } else {
                format!(" ({} = {})", rule.key, rule.value)
            };
            ctx.reply(format!("[{state}] {}: {}{slot}", rule.name, rule.description)).await;
        }
        Ok(())
    }
}

/// Handler for the setrule command.
pub struct SetRuleCommand;

#[async_trait]
impl Command for SetRuleCommand {
    fn name(&self) -> &str {
        "setrule"
    }

    fn description(&self) -> &str {
        "Change a moderation rule setting"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("name", "Rule to change", ParameterKind::String),
            ParameterSpec::required(
                "key",
                "Setting to change, or `enabled` to toggle the rule",
                ParameterKind::String,
            ),
            ParameterSpec::optional("value", "New value", ParameterKind::String),
        ]
    }

    fn permissions(&self) -> Option<u64> {
        Some(MANAGE_GUILD)
    }

    async fn execute(&self, ctx: &Context) -> CommandResult {
        let name = ctx.require_string("name")?;
        let key = ctx.require_string("key")?;
        let value = ctx.arg_string("value").unwrap_or_default();

        ctx.info().set_rule(&name, &key, &value)?;

        let who = ctx.caller().map(|c| c.name.as_str()).unwrap_or("*");
        info!(rule = %name, key = %key, caller = %who, "Rule updated");
        ctx.reply(format!("Rule `{name}` updated: {key} = {value}")).await;
        Ok(())
    }
}
