//! The bot: wires state, registry and dispatcher, and drives a session.

use crate::config::Config;
use crate::control::{BotInfo, Rule};
use crate::error::{RegistryError, SessionError};
use crate::handlers::core::middleware::{logging, permissions, recover};
use crate::handlers::{Command, Dispatcher, Registry, builtin_commands};
use crate::session::{Session, SessionEvent};
use crate::state::BotState;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// A running bot instance. Cloning is cheap and shares all state.
#[derive(Clone)]
pub struct Bot {
    name: String,
    state: Arc<BotState>,
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
}

impl Bot {
    /// Create a bot with the builtin commands and middleware installed.
    ///
    /// Middleware order, outermost first: recover, logging, permissions, usage.
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Result<Self, RegistryError> {
        let state = Arc::new(BotState::new(rules));
        let registry = Arc::new(Registry::new());
        for command in builtin_commands() {
            registry.register(command)?;
        }

        let middlewares = [
            Some(recover()),
            Some(logging()),
            Some(permissions()),
            Some(state.usage_middleware()),
        ];
        let info: Arc<dyn BotInfo> = state.clone();
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry), info, &middlewares));

        Ok(Self {
            name: name.into(),
            state,
            registry,
            dispatcher,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        Self::new(config.bot.name.clone(), config.initial_rules())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an additional command.
    pub fn register(&self, command: Arc<dyn Command>) -> Result<(), RegistryError> {
        self.registry.register(command)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn state(&self) -> &Arc<BotState> {
        &self.state
    }

    /// The bot as seen by the control server.
    pub fn info(&self) -> Arc<dyn BotInfo> {
        self.state.clone()
    }

    /// Apply one session event.
    pub async fn handle_event(&self, session: &dyn Session, event: SessionEvent) {
        match event {
            SessionEvent::Ready { guilds } => {
                self.state.set_guild_count(guilds);
                info!(bot = %self.name, guilds, "Session ready");
            }
            SessionEvent::GuildJoined => {
                self.state.guild_joined();
                debug!(guilds = self.state.guild_count(), "Joined guild");
            }
            SessionEvent::GuildLeft => {
                self.state.guild_left();
                debug!(guilds = self.state.guild_count(), "Left guild");
            }
            SessionEvent::Interaction(interaction) => {
                let response = self.dispatcher.handle(interaction.clone()).await;
                if let Err(e) = session.respond(&interaction, &response).await {
                    warn!(
                        command = %interaction.command,
                        interaction = %interaction.id,
                        error = %e,
                        "Failed to deliver response"
                    );
                }
            }
        }
    }

    /// Open `session`, declare commands, and handle events until the session
    /// ends or `shutdown` resolves. Each interaction is handled on its own
    /// task; in-flight interactions are awaited before the session is closed.
    pub async fn run<F>(&self, session: Arc<dyn Session>, shutdown: F) -> Result<(), SessionError>
    where
        F: Future<Output = ()>,
    {
        let mut events = session.open().await?;

        let schemas = self.registry.application_commands();
        session.register_commands(&schemas).await?;
        info!(bot = %self.name, commands = schemas.len(), "Commands registered with session");

        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        info!("Session event stream ended");
                        break;
                    };
                    // Membership events are applied in arrival order.
                    if !matches!(event, SessionEvent::Interaction(_)) {
                        self.handle_event(session.as_ref(), event).await;
                        continue;
                    }
                    let bot = self.clone();
                    let session = Arc::clone(&session);
                    tasks.spawn(async move { bot.handle_event(session.as_ref(), event).await });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "Event task failed");
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Event task failed");
            }
        }
        session.close().await
    }
}
