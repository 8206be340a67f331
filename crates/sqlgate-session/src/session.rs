//! ChallengeSession: the immutable configuration of one challenge phase.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlgate_core::errors::ConfigError;
use sqlgate_core::Operation;

use crate::validator::Validator;

/// One phase's rules. Built once when the phase opens and replaced wholesale
/// by the next phase; never edited in place.
#[derive(Debug, Clone, Default)]
pub struct ChallengeSession {
    allowed_operation: Option<Operation>,
    validator: Option<Validator>,
    success_message: Option<String>,
    auto_close_delay: Duration,
    auto_close_on_success: bool,
    challenge_index: Option<usize>,
}

impl ChallengeSession {
    pub fn builder() -> ChallengeSessionBuilder {
        ChallengeSessionBuilder::default()
    }

    /// Any non-SELECT operation, default message and delay, auto-close on,
    /// no progress slot.
    pub fn unrestricted(validator: Option<Validator>) -> Self {
        let mut builder = Self::builder();
        if let Some(v) = validator {
            builder = builder.validator(v);
        }
        builder.build()
    }

    /// `None` accepts any of the six DDL/DML operations.
    pub fn allowed_operation(&self) -> Option<&Operation> {
        self.allowed_operation.as_ref()
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// `None` means "use the configured default".
    pub fn success_message(&self) -> Option<&str> {
        self.success_message.as_deref()
    }

    /// Zero means "use the configured default".
    pub fn auto_close_delay(&self) -> Duration {
        self.auto_close_delay
    }

    pub fn auto_close_on_success(&self) -> bool {
        self.auto_close_on_success
    }

    pub fn challenge_index(&self) -> Option<usize> {
        self.challenge_index
    }
}

/// Builder for [`ChallengeSession`].
#[derive(Debug)]
pub struct ChallengeSessionBuilder {
    session: ChallengeSession,
}

impl Default for ChallengeSessionBuilder {
    fn default() -> Self {
        Self {
            session: ChallengeSession {
                auto_close_on_success: true,
                ..ChallengeSession::default()
            },
        }
    }
}

impl ChallengeSessionBuilder {
    pub fn allow(mut self, operation: Operation) -> Self {
        self.session.allowed_operation = Some(operation);
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.session.validator = Some(validator);
        self
    }

    /// Blank messages are treated as unset.
    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.session.success_message = if message.trim().is_empty() {
            None
        } else {
            Some(message)
        };
        self
    }

    pub fn auto_close_after(mut self, delay: Duration) -> Self {
        self.session.auto_close_delay = delay;
        self
    }

    pub fn auto_close_on_success(mut self, enabled: bool) -> Self {
        self.session.auto_close_on_success = enabled;
        self
    }

    pub fn challenge_index(mut self, index: usize) -> Self {
        self.session.challenge_index = Some(index);
        self
    }

    pub fn build(self) -> ChallengeSession {
        self.session
    }
}

/// A phase as authored in data (e.g. a TOML level file). The validator is
/// code and is attached when the phase is turned into a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDefinition {
    /// CREATE | INSERT | UPDATE | DELETE | ALTER | DROP, or absent for any.
    pub allowed_operation: Option<String>,
    pub success_message: Option<String>,
    pub close_delay_secs: f64,
    pub auto_close_on_success: bool,
    /// Progress slot; negative means none.
    pub challenge_index: i64,
}

impl Default for PhaseDefinition {
    fn default() -> Self {
        Self {
            allowed_operation: None,
            success_message: None,
            close_delay_secs: 1.0,
            auto_close_on_success: true,
            challenge_index: -1,
        }
    }
}

impl PhaseDefinition {
    /// Build the session for this phase. Negative delays clamp to zero.
    pub fn into_session(self, validator: Option<Validator>) -> Result<ChallengeSession, ConfigError> {
        let mut builder = ChallengeSession::builder()
            .auto_close_on_success(self.auto_close_on_success);

        if let Some(op) = self.allowed_operation.as_deref().filter(|s| !s.trim().is_empty()) {
            let op: Operation = op.parse().map_err(|message| ConfigError::InvalidValue {
                field: "allowed_operation".to_string(),
                message,
            })?;
            builder = builder.allow(op);
        }

        if let Some(message) = self.success_message {
            builder = builder.success_message(message);
        }

        let delay = Duration::try_from_secs_f64(self.close_delay_secs.max(0.0)).map_err(|e| {
            ConfigError::InvalidValue {
                field: "close_delay_secs".to_string(),
                message: e.to_string(),
            }
        })?;
        builder = builder.auto_close_after(delay);

        if let Ok(index) = usize::try_from(self.challenge_index) {
            builder = builder.challenge_index(index);
        }

        if let Some(v) = validator {
            builder = builder.validator(v);
        }

        Ok(builder.build())
    }
}
