//! Console session: reads commands from stdin, writes responses to stdout.
//!
//! Each input line of the form `/<command> key=value ...` becomes one
//! interaction invoked by a local operator holding every permission.

use super::{Session, SessionEvent};
use crate::error::SessionError;
use crate::handlers::{Caller, CommandSchema, Interaction, InteractionResponse, OptionValue};
use crate::telemetry::spans;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

/// Capacity of the event channel.
const EVENT_QUEUE: usize = 64;

/// Parse one console line into an interaction.
///
/// Returns `None` for blank lines and lines not starting with `prefix`.
/// Arguments without `=` are ignored.
pub fn parse_line(line: &str, prefix: &str) -> Option<Interaction> {
    let rest = line.trim().strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?;

    let mut interaction = Interaction::new(name);
    for token in tokens {
        if let Some((key, value)) = token.split_once('=') {
            if !key.is_empty() {
                interaction = interaction.with_arg(key, OptionValue::parse(value));
            }
        }
    }
    Some(interaction)
}

fn operator() -> Caller {
    Caller {
        id: "console".to_string(),
        name: "console".to_string(),
        permissions: u64::MAX,
    }
}

/// Session backed by the process's stdin/stdout.
pub struct ConsoleSession {
    prefix: String,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl ConsoleSession {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            reader: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Session for ConsoleSession {
    async fn open(&self) -> Result<mpsc::Receiver<SessionEvent>, SessionError> {
        let mut reader = self.reader.lock();
        if reader.is_some() {
            return Err(SessionError::AlreadyOpen);
        }

        let (tx, rx) = mpsc::channel(EVENT_QUEUE);
        let prefix = self.prefix.clone();
        let task = tokio::spawn(
            async move {
                if tx.send(SessionEvent::Ready { guilds: 1 }).await.is_err() {
                    return;
                }
                let mut lines = BufReader::new(tokio::io::stdin()).lines();
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) => {
                            let Some(interaction) = parse_line(&line, &prefix) else {
                                continue;
                            };
                            let event =
                                SessionEvent::Interaction(interaction.with_caller(operator()));
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => {
                            debug!("Console input closed");
                            break;
                        }
                        Err(e) => {
                            warn!(error = %e, "Console read failed");
                            break;
                        }
                    }
                }
            }
            .instrument(spans::session("console")),
        );

        *reader = Some(task);
        info!(prefix = %self.prefix, "Console session open");
        Ok(rx)
    }

    async fn register_commands(&self, schemas: &[CommandSchema]) -> Result<(), SessionError> {
        let names: Vec<&str> = schemas.iter().map(|s| s.name.as_str()).collect();
        info!(count = names.len(), commands = %names.join(", "), "Commands declared");
        Ok(())
    }

    async fn respond(
        &self,
        interaction: &Interaction,
        response: &InteractionResponse,
    ) -> Result<(), SessionError> {
        if self.reader.lock().is_none() {
            return Err(SessionError::NotOpen);
        }

        let tag = if response.failed { "error" } else { "ok" };
        let mut out = String::new();
        for line in response.content.lines() {
            out.push_str(&format!("[{}] {tag}> {line}\n", interaction.command));
        }

        let mut stdout = tokio::io::stdout();
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        if let Some(task) = self.reader.lock().take() {
            task.abort();
            info!("Console session closed");
        }
        Ok(())
    }
}
