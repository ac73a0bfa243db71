//! Default value functions for configuration.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Bot Defaults
// =============================================================================

pub fn default_bot_name() -> String {
    "modbot".to_string()
}

pub fn default_command_prefix() -> String {
    "/".to_string()
}

// =============================================================================
// Control API Defaults
// =============================================================================

pub fn default_control_port() -> u16 {
    8089
}
