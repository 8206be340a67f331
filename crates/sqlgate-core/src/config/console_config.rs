//! Console (session controller) configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shown on commit when a phase does not set its own message.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Congratulations, you completed the challenge!";

/// Configuration for session defaults and auto-close timing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Fallback success message.
    pub default_success_message: Option<String>,
    /// Auto-close delay used when a phase asks for zero. Default: 1000ms.
    pub default_close_delay_ms: Option<u64>,
    /// Upper bound for any phase's auto-close delay. Default: 5000ms.
    pub max_close_delay_ms: Option<u64>,
}

impl ConsoleConfig {
    /// Returns the effective default success message.
    pub fn effective_success_message(&self) -> &str {
        match self.default_success_message.as_deref() {
            Some(msg) if !msg.trim().is_empty() => msg,
            _ => DEFAULT_SUCCESS_MESSAGE,
        }
    }

    /// Returns the effective default close delay, defaulting to 1s.
    pub fn effective_close_delay(&self) -> Duration {
        Duration::from_millis(self.default_close_delay_ms.unwrap_or(1000))
    }

    /// Returns the effective maximum close delay, defaulting to 5s.
    pub fn effective_max_close_delay(&self) -> Duration {
        Duration::from_millis(self.max_close_delay_ms.unwrap_or(5000))
    }

    /// Resolve the delay a phase asked for: zero falls back to the default,
    /// anything above the maximum is clamped.
    pub fn resolve_close_delay(&self, requested: Duration) -> Duration {
        let delay = if requested.is_zero() {
            self.effective_close_delay()
        } else {
            requested
        };
        delay.min(self.effective_max_close_delay())
    }
}
