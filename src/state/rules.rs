//! In-memory moderation rule book.

use crate::control::Rule;
use crate::error::RuleError;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Key that toggles a rule on or off instead of setting its key/value slot.
pub const ENABLED_KEY: &str = "enabled";

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Rules keyed by name. Reads take a shared lock; `set` is a single
/// read-modify-write under the exclusive lock.
#[derive(Debug, Default)]
pub struct RuleBook {
    rules: RwLock<BTreeMap<String, Rule>>,
}

impl RuleBook {
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        let rules = rules.into_iter().map(|r| (r.name.clone(), r)).collect();
        Self {
            rules: RwLock::new(rules),
        }
    }

    /// All rules, sorted by name.
    pub fn list(&self) -> Vec<Rule> {
        self.rules.read().values().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Rule> {
        self.rules.read().get(name).cloned()
    }

    /// Number of enabled rules.
    pub fn active_count(&self) -> usize {
        self.rules.read().values().filter(|r| r.enabled).count()
    }

    /// Update the rule `name`.
    ///
    /// `enabled` toggles the rule and requires a boolean value; any other key
    /// replaces the rule's key/value slot.
    pub fn set(&self, name: &str, key: &str, value: &str) -> Result<(), RuleError> {
        let mut rules = self.rules.write();
        let rule = rules
            .get_mut(name)
            .ok_or_else(|| RuleError::NotFound(name.to_string()))?;

        if key == ENABLED_KEY {
            rule.enabled = parse_bool(value).ok_or_else(|| RuleError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            })?;
        } else {
            rule.key = key.to_string();
            rule.value = value.to_string();
        }
        Ok(())
    }
}
