//! Store connection configuration.

use serde::{Deserialize, Serialize};

/// SQLite journal mode applied at connection open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
    Truncate,
    Memory,
}

impl JournalMode {
    /// The value as written in `PRAGMA journal_mode = ...`.
    pub fn as_pragma(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Memory => "MEMORY",
        }
    }

    /// Parse a journal mode name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WAL" => Some(JournalMode::Wal),
            "DELETE" => Some(JournalMode::Delete),
            "TRUNCATE" => Some(JournalMode::Truncate),
            "MEMORY" => Some(JournalMode::Memory),
            _ => None,
        }
    }
}

/// Configuration for the challenge store connection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// How long a write waits on a lock before failing. Default: 3000ms.
    pub busy_timeout_ms: Option<u64>,
    /// Journal mode. Default: WAL.
    pub journal_mode: Option<JournalMode>,
}

impl StorageConfig {
    /// Returns the effective busy timeout, defaulting to 3000ms.
    pub fn effective_busy_timeout_ms(&self) -> u64 {
        self.busy_timeout_ms.unwrap_or(3000)
    }

    /// Returns the effective journal mode, defaulting to WAL.
    pub fn effective_journal_mode(&self) -> JournalMode {
        self.journal_mode.unwrap_or_default()
    }
}
