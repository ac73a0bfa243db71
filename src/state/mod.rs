//! Shared runtime state of the bot.
//!
//! [`BotState`] holds the counters and rules that the control API and the
//! builtin commands read. It is the process's [`BotInfo`] implementation.

mod rules;

pub use rules::{ENABLED_KEY, RuleBook};

use crate::control::{BotInfo, Rule, StatsSnapshot};
use crate::error::RuleError;
use crate::handlers::core::{Context, Middleware, handler, middleware};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

/// Format a number of seconds as `1h2m3s`, dropping leading zero units.
pub fn format_uptime(total_secs: i64) -> String {
    let total = total_secs.max(0);
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}

/// Counters, guild membership and rules for a running bot.
pub struct BotState {
    started: DateTime<Utc>,
    commands_executed: AtomicI64,
    /// Per-command usage counters.
    usage: DashMap<String, u64>,
    guilds: AtomicUsize,
    rules: RuleBook,
}

impl BotState {
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            started: Utc::now(),
            commands_executed: AtomicI64::new(0),
            usage: DashMap::new(),
            guilds: AtomicUsize::new(0),
            rules: RuleBook::new(rules),
        }
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    pub fn rule_book(&self) -> &RuleBook {
        &self.rules
    }

    /// Count one executed command.
    pub fn record_command(&self, name: &str) {
        self.commands_executed.fetch_add(1, Ordering::Relaxed);
        *self.usage.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn commands_executed(&self) -> i64 {
        self.commands_executed.load(Ordering::Relaxed)
    }

    pub fn guild_count(&self) -> usize {
        self.guilds.load(Ordering::Relaxed)
    }

    pub fn set_guild_count(&self, count: usize) {
        self.guilds.store(count, Ordering::Relaxed);
    }

    pub fn guild_joined(&self) {
        self.guilds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn guild_left(&self) {
        let _ = self
            .guilds
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Middleware counting every command that reaches it.
    pub fn usage_middleware(self: &Arc<Self>) -> Middleware {
        let state = Arc::clone(self);
        middleware(move |next| {
            let state = Arc::clone(&state);
            handler(move |ctx: Context| {
                let next = Arc::clone(&next);
                state.record_command(ctx.command_name());
                async move { next(ctx).await }
            })
        })
    }
}

impl BotInfo for BotState {
    fn stats(&self) -> Option<StatsSnapshot> {
        let uptime = (Utc::now() - self.started).num_seconds();
        Some(StatsSnapshot {
            uptime: format_uptime(uptime),
            start_time: self.started.timestamp(),
            commands_executed: self.commands_executed(),
            guild_count: self.guild_count(),
            active_rules: self.rules.active_count(),
        })
    }

    fn rules(&self) -> Option<Vec<Rule>> {
        Some(self.rules.list())
    }

    fn set_rule(&self, name: &str, key: &str, value: &str) -> Result<(), RuleError> {
        self.rules.set(name, key, value)
    }

    fn command_usage(&self) -> Vec<(String, u64)> {
        let mut usage: Vec<_> = self
            .usage
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        usage.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        usage
    }
}
