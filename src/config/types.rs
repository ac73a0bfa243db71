//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::defaults::{default_bot_name, default_command_prefix, default_control_port, default_true};
use super::validation::{ValidationError, validate};
use crate::control::Rule;

/// Environment variable overriding `bot.token`.
pub const TOKEN_ENV: &str = "MODBOT_TOKEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot identity and credentials.
    pub bot: BotConfig,
    /// Control API configuration.
    #[serde(default)]
    pub control: ControlConfig,
    /// Moderation rules loaded at startup.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Config {
    /// Load configuration from a TOML file, apply the token override and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            config.apply_token_override(token);
        }
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Parse TOML without validation.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Replace the configured token; empty overrides are ignored.
    pub fn apply_token_override(&mut self, token: String) {
        if !token.trim().is_empty() {
            self.bot.token = token;
        }
    }

    /// Rules in their runtime form.
    pub fn initial_rules(&self) -> Vec<Rule> {
        self.rules.iter().cloned().map(Rule::from).collect()
    }
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Display name used in logs.
    #[serde(default = "default_bot_name")]
    pub name: String,
    /// Platform token. Required, may come from `MODBOT_TOKEN`.
    #[serde(default)]
    pub token: String,
    /// Prefix of console commands (default: "/").
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

/// Control API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlConfig {
    /// Serve the control API (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Loopback port (default: 8089).
    #[serde(default = "default_control_port")]
    pub port: u16,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            port: default_control_port(),
        }
    }
}

/// A moderation rule seeded from config.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl From<RuleConfig> for Rule {
    fn from(rule: RuleConfig) -> Self {
        Self {
            name: rule.name,
            description: rule.description,
            enabled: rule.enabled,
            key: rule.key,
            value: rule.value,
        }
    }
}
