//! Configurable `BotInfo` fake.

use modbot::control::{BotInfo, Rule, StatsSnapshot};
use modbot::error::RuleError;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// `BotInfo` returning fixed values and recording every `set_rule` call.
#[derive(Default)]
pub struct RecordingInfo {
    pub stats: Option<StatsSnapshot>,
    pub rules: Option<Vec<Rule>>,
    /// Error returned by `set_rule`, if any.
    pub set_error: Option<RuleError>,
    /// How long `set_rule` blocks its thread before returning.
    pub set_delay: Option<Duration>,
    /// Notified each time `set_rule` is entered.
    pub entered: Notify,
    calls: Mutex<Vec<(String, String, String)>>,
}

#[allow(dead_code)]
impl RecordingInfo {
    pub fn with_stats(mut self, stats: StatsSnapshot) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn failing(mut self, error: RuleError) -> Self {
        self.set_error = Some(error);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.set_delay = Some(delay);
        self
    }

    /// `(name, key, value)` of every `set_rule` call so far.
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().clone()
    }
}

impl BotInfo for RecordingInfo {
    fn stats(&self) -> Option<StatsSnapshot> {
        self.stats.clone()
    }

    fn rules(&self) -> Option<Vec<Rule>> {
        self.rules.clone()
    }

    fn set_rule(&self, name: &str, key: &str, value: &str) -> Result<(), RuleError> {
        self.calls
            .lock()
            .push((name.to_string(), key.to_string(), value.to_string()));
        self.entered.notify_one();
        if let Some(delay) = self.set_delay {
            std::thread::sleep(delay);
        }
        match &self.set_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}
