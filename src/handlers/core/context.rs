//! Command execution context and the interaction types it is built from.
//!
//! A [`Context`] is created once per dispatched interaction, moved through
//! the middleware chain, and dropped when the command returns. Replies are
//! captured in a shared buffer so the dispatcher can deliver them (or an
//! error message) to the session in one response.

use super::traits::Command;
use crate::control::BotInfo;
use crate::error::CommandError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Value of a single invocation argument.
///
/// `Display` renders the value as text; for values built by
/// [`OptionValue::parse`] that text is exactly the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl OptionValue {
    /// Interpret a raw text argument, preferring the narrowest kind.
    ///
    /// A token is only typed when it renders back unchanged, so `007`, `+5`
    /// and `-0` stay strings.
    pub fn parse(raw: &str) -> Self {
        if let Some(n) = raw.parse::<i64>().ok().filter(|n| n.to_string() == raw) {
            return Self::Integer(n);
        }
        match raw {
            "true" => Self::Boolean(true),
            "false" => Self::Boolean(false),
            _ => Self::String(raw.to_string()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Identity of the user who triggered an interaction, as supplied by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
    pub name: String,
    /// Platform permission bits held by the caller in this guild.
    pub permissions: u64,
}

impl Caller {
    /// Whether every bit of `mask` is held.
    #[inline]
    pub fn has_permissions(&self, mask: u64) -> bool {
        self.permissions & mask == mask
    }
}

/// An inbound invocation event delivered by the session.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: String,
    pub command: String,
    pub args: BTreeMap<String, OptionValue>,
    pub caller: Option<Caller>,
}

impl Interaction {
    /// Create an interaction with a fresh id and no arguments.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            command: command.into(),
            args: BTreeMap::new(),
            caller: None,
        }
    }

    /// Add an argument.
    pub fn with_arg(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.args.insert(name.into(), value);
        self
    }

    /// Attach the invoking user.
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }
}

/// Buffer collecting reply lines for an interaction.
#[derive(Clone, Default)]
pub struct ReplyBuffer(Arc<Mutex<Vec<String>>>);

impl ReplyBuffer {
    pub async fn push(&self, content: String) {
        let mut guard = self.0.lock().await;
        guard.push(content);
    }

    /// Take every captured line, leaving the buffer empty.
    pub async fn drain(&self) -> Vec<String> {
        let mut guard = self.0.lock().await;
        std::mem::take(&mut *guard)
    }
}

/// Execution context passed to each command.
pub struct Context {
    command: Arc<dyn Command>,
    interaction_id: String,
    args: BTreeMap<String, OptionValue>,
    caller: Option<Caller>,
    info: Arc<dyn BotInfo>,
    replies: ReplyBuffer,
}

impl Context {
    /// Build the context for one interaction.
    pub fn new(
        command: Arc<dyn Command>,
        interaction: Interaction,
        info: Arc<dyn BotInfo>,
        replies: ReplyBuffer,
    ) -> Self {
        Self {
            command,
            interaction_id: interaction.id,
            args: interaction.args,
            caller: interaction.caller,
            info,
            replies,
        }
    }

    /// The command being executed.
    pub fn command(&self) -> &Arc<dyn Command> {
        &self.command
    }

    pub fn command_name(&self) -> &str {
        self.command.name()
    }

    pub fn interaction_id(&self) -> &str {
        &self.interaction_id
    }

    pub fn caller(&self) -> Option<&Caller> {
        self.caller.as_ref()
    }

    /// Shared bot state.
    pub fn info(&self) -> &Arc<dyn BotInfo> {
        &self.info
    }

    pub fn arg(&self, name: &str) -> Option<&OptionValue> {
        self.args.get(name)
    }

    /// Argument rendered as text, whatever its kind.
    pub fn arg_string(&self, name: &str) -> Option<String> {
        self.args.get(name).map(ToString::to_string)
    }

    /// Argument rendered as text, failing with `MissingArgument` if absent.
    pub fn require_string(&self, name: &str) -> Result<String, CommandError> {
        self.arg_string(name)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CommandError::MissingArgument(name.to_string()))
    }

    /// Queue a reply line for the invoking user.
    pub async fn reply(&self, content: impl Into<String>) {
        self.replies.push(content.into()).await;
    }
}
