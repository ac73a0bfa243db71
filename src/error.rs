//! Unified error handling for modbot.
//!
//! Each boundary of the bot has its own error enum: registration, command
//! execution, dispatch, rule mutation and the control server. Wrapping
//! variants keep their cause reachable through `source()`.

use std::net::SocketAddr;
use thiserror::Error;

// ============================================================================
// Registry Errors (command registration)
// ============================================================================

/// Errors returned by [`crate::handlers::Registry::register`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid command: {0}")]
    InvalidInput(&'static str),

    #[error("command already registered: {0}")]
    AlreadyRegistered(String),
}

impl RegistryError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::AlreadyRegistered(_) => "already_registered",
        }
    }
}

// ============================================================================
// Rule Errors (BotInfo mutation)
// ============================================================================

/// Errors produced when mutating a moderation rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule not found: {0}")]
    NotFound(String),

    #[error("invalid value {value:?} for key {key:?}")]
    InvalidValue { key: String, value: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl RuleError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "rule_not_found",
            Self::InvalidValue { .. } => "invalid_value",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Whether the failure was caused by the caller's input rather than the bot.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidValue { .. })
    }
}

// ============================================================================
// Command Errors (command execution)
// ============================================================================

/// Errors that can occur while executing a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("missing argument: {0}")]
    MissingArgument(String),

    #[error("invalid argument {name}: {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("permission denied")]
    Denied,

    #[error("command panicked: {0}")]
    Panicked(String),

    #[error("failed to update rule")]
    Rule(#[from] RuleError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CommandError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingArgument(_) => "missing_argument",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Denied => "denied",
            Self::Panicked(_) => "panicked",
            Self::Rule(_) => "rule_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Concise text suitable for showing to the invoking user.
    ///
    /// Panics and internal failures are collapsed to a generic message so no
    /// internal detail reaches chat.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingArgument(name) => format!("Missing argument `{name}`."),
            Self::InvalidArgument { name, reason } => {
                format!("Invalid argument `{name}`: {reason}.")
            }
            Self::Denied => "You do not have permission to use this command.".to_string(),
            Self::Rule(RuleError::NotFound(name)) => format!("No rule named `{name}`."),
            Self::Rule(RuleError::InvalidValue { key, value }) => {
                format!("`{value}` is not a valid value for `{key}`.")
            }
            Self::Panicked(_) | Self::Rule(RuleError::Internal(_)) | Self::Internal(_) => {
                "Something went wrong while running this command.".to_string()
            }
        }
    }
}

/// Result type for commands and middleware handlers.
pub type CommandResult = Result<(), CommandError>;

// ============================================================================
// Dispatch Errors (interaction dispatch)
// ============================================================================

/// Errors surfaced by the interaction dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("command not found: {0}")]
    NotFound(String),

    #[error("command {name} failed")]
    Command {
        name: String,
        #[source]
        source: CommandError,
    },
}

impl DispatchError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "unknown_command",
            Self::Command { source, .. } => source.error_code(),
        }
    }

    /// Text reported back to the invoking user.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(name) => format!("Unknown command `{name}`."),
            Self::Command { source, .. } => source.user_message(),
        }
    }
}

// ============================================================================
// Control Server Errors
// ============================================================================

/// Errors from the control server lifecycle.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("control server already listening on {0}")]
    AlreadyStarted(SocketAddr),

    #[error("failed to bind control server on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Session Errors
// ============================================================================

/// Errors reported by a chat session implementation.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is not open")]
    NotOpen,

    #[error("session already open")]
    AlreadyOpen,

    #[error("session I/O error")]
    Io(#[from] std::io::Error),
}
