//! Chat platform session abstraction.
//!
//! The bot never speaks a platform protocol itself. A [`Session`] opens the
//! connection, declares the bot's commands, delivers [`SessionEvent`]s and
//! carries responses back. [`ConsoleSession`] is a local implementation
//! driven from stdin.

mod console;

pub use console::ConsoleSession;

use crate::error::SessionError;
use crate::handlers::{CommandSchema, Interaction, InteractionResponse};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Events delivered by a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Connection established; the bot is a member of `guilds` guilds.
    Ready { guilds: usize },
    GuildJoined,
    GuildLeft,
    /// A user invoked a command.
    Interaction(Interaction),
}

/// Connection to a chat platform.
#[async_trait]
pub trait Session: Send + Sync {
    /// Open the connection. Events arrive on the returned channel until the
    /// session closes.
    async fn open(&self) -> Result<mpsc::Receiver<SessionEvent>, SessionError>;

    /// Declare the bot's commands to the platform in bulk.
    async fn register_commands(&self, schemas: &[CommandSchema]) -> Result<(), SessionError>;

    /// Deliver the response to an interaction.
    async fn respond(
        &self,
        interaction: &Interaction,
        response: &InteractionResponse,
    ) -> Result<(), SessionError>;

    async fn close(&self) -> Result<(), SessionError>;
}
