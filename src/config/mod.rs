//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and loading
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup validation

mod defaults;
mod types;
mod validation;

pub use types::{BotConfig, Config, ConfigError, ControlConfig, RuleConfig, TOKEN_ENV};
pub use validation::{ValidationError, validate};
