//! Configuration system for sqlgate.
//! TOML-based, 3-layer resolution: env > project > defaults.

pub mod console_config;
pub mod sqlgate_config;
pub mod storage_config;

pub use console_config::ConsoleConfig;
pub use sqlgate_config::SqlGateConfig;
pub use storage_config::{JournalMode, StorageConfig};
