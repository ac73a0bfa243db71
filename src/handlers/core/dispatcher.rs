//! Interaction dispatch.
//!
//! The `Dispatcher` resolves an inbound [`Interaction`] to a registered
//! command and runs it through the middleware chain, which is composed once
//! in [`Dispatcher::new`] and reused for every call.

use super::context::{Context, Interaction, ReplyBuffer};
use super::middleware::{Handler, Middleware, chain, execute};
use super::registry::Registry;
use crate::control::BotInfo;
use crate::error::DispatchError;
use std::sync::Arc;
use tracing::debug;

/// Reply delivered to the session for one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionResponse {
    pub content: String,
    /// Only the invoking user sees the reply.
    pub ephemeral: bool,
    pub failed: bool,
}

impl InteractionResponse {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
            failed: false,
        }
    }

    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
            failed: true,
        }
    }
}

/// Routes interactions to commands.
pub struct Dispatcher {
    registry: Arc<Registry>,
    info: Arc<dyn BotInfo>,
    handler: Handler,
}

impl Dispatcher {
    /// Create a dispatcher, composing `middlewares` around command execution.
    pub fn new(
        registry: Arc<Registry>,
        info: Arc<dyn BotInfo>,
        middlewares: &[Option<Middleware>],
    ) -> Self {
        Self {
            registry,
            info,
            handler: chain(middlewares, execute()),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Run an interaction and return the reply lines the command produced.
    pub async fn dispatch(&self, interaction: Interaction) -> Result<Vec<String>, DispatchError> {
        let Some(command) = self.registry.get(&interaction.command) else {
            debug!(command = %interaction.command, "Unknown command");
            return Err(DispatchError::NotFound(interaction.command));
        };

        let name = command.name().to_string();
        let replies = ReplyBuffer::default();
        let ctx = Context::new(command, interaction, Arc::clone(&self.info), replies.clone());

        match (self.handler)(ctx).await {
            Ok(()) => Ok(replies.drain().await),
            Err(source) => Err(DispatchError::Command { name, source }),
        }
    }

    /// Run an interaction and turn the outcome into a response for the caller.
    ///
    /// Never fails: unknown commands and command errors become failure responses.
    pub async fn handle(&self, interaction: Interaction) -> InteractionResponse {
        match self.dispatch(interaction).await {
            Ok(lines) if lines.is_empty() => InteractionResponse::success("Done."),
            Ok(lines) => InteractionResponse::success(lines.join("\n")),
            Err(e) => {
                debug!(error = %e, code = e.error_code(), "Interaction failed");
                InteractionResponse::failure(e.user_message())
            }
        }
    }
}
