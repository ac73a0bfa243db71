//! The command contract and the schema it declares to the chat platform.
//!
//! A [`Command`] is a named unit of work. The registry stores commands as
//! `Arc<dyn Command>` and never mutates them; the platform only ever sees the
//! [`CommandSchema`] derived from a command.

use super::context::Context;
use crate::error::CommandResult;
use async_trait::async_trait;
use serde::Serialize;

/// Kind of value a command parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Integer,
    Boolean,
    User,
    Channel,
}

/// One declared parameter of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    pub description: String,
    pub kind: ParameterKind,
    pub required: bool,
}

impl ParameterSpec {
    /// A required parameter.
    pub fn required(name: &str, description: &str, kind: ParameterKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            required: true,
        }
    }

    /// An optional parameter.
    pub fn optional(name: &str, description: &str, kind: ParameterKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, description, kind)
        }
    }
}

/// Platform-facing declaration of a command, used for bulk registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSchema {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    /// Permission bits a caller needs, `None` when everyone may invoke it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<u64>,
}

/// A named, invokable unit of bot functionality.
///
/// # Example
///
/// ```ignore
/// pub struct PingCommand;
///
/// #[async_trait]
/// impl Command for PingCommand {
///     fn name(&self) -> &str { "ping" }
///     fn description(&self) -> &str { "Check that the bot is alive" }
///
///     async fn execute(&self, ctx: &Context) -> CommandResult {
///         ctx.reply("Pong!").await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Command: Send + Sync {
    /// Unique, case-sensitive name.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Ordered parameter schema.
    fn parameters(&self) -> Vec<ParameterSpec> {
        Vec::new()
    }

    /// Permission bits the caller must hold.
    fn permissions(&self) -> Option<u64> {
        None
    }

    /// Run the command.
    async fn execute(&self, ctx: &Context) -> CommandResult;

    /// Schema declared to the chat platform.
    fn schema(&self) -> CommandSchema {
        CommandSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
            default_member_permissions: self.permissions(),
        }
    }
}
