//! Control plane: the loopback HTTP service exposing bot state, and a client for it.
//!
//! The server only depends on the [`BotInfo`] capability, so anything that
//! can report stats and rules can be served.

pub mod client;
pub mod server;

pub use client::ControlClient;
pub use server::ControlServer;

use crate::error::RuleError;
use serde::{Deserialize, Serialize};

/// Point-in-time read of bot counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Time since start, e.g. `1h2m3s`.
    pub uptime: String,
    /// Start time, seconds since the Unix epoch.
    pub start_time: i64,
    pub commands_executed: i64,
    pub guild_count: usize,
    pub active_rules: usize,
}

/// One configurable moderation setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub key: String,
    pub value: String,
}

/// Read/write view of the running bot used by the control server and commands.
///
/// Implementations must be safe for concurrent reads, and `set_rule` must be
/// safe for concurrent read-modify-write.
pub trait BotInfo: Send + Sync {
    /// Current statistics, `None` if they cannot be produced.
    fn stats(&self) -> Option<StatsSnapshot>;

    /// All rules; `None` is treated as empty.
    fn rules(&self) -> Option<Vec<Rule>>;

    /// Update one rule.
    fn set_rule(&self, name: &str, key: &str, value: &str) -> Result<(), RuleError>;

    /// Executions per command, most used first. Empty when not tracked.
    fn command_usage(&self) -> Vec<(String, u64)> {
        Vec::new()
    }
}
