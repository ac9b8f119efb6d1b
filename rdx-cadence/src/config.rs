//! Defines the configuration structure for a `CadenceScheduler`.
//!
//! The struct is designed to be deserialized from a configuration file
//! (e.g., a TOML file) using `serde`. Every field has a default, so an
//! empty file (or no file at all) yields a usable configuration.

use serde::Deserialize;

/// The top-level configuration for a [`CadenceScheduler`](crate::scheduler::CadenceScheduler).
#[derive(Debug, Clone, Deserialize)]
pub struct CadenceConfig {
    /// A label for this scheduler instance, used in log lines and spans.
    /// Several independent schedulers may coexist in one process; the name
    /// tells their output apart.
    #[serde(default = "default_name")]
    pub name: String,

    /// Capacity of the broadcast channels carrying `SystemEvent` and
    /// `TaskEvent` streams. Slow subscribers that fall further behind than
    /// this lag and skip ahead; scheduling is never affected.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl CadenceConfig {
    /// Loads configuration from a file (extension resolved by the `config`
    /// crate, e.g. `cadence` finds `cadence.toml`). Missing keys fall back
    /// to their defaults.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

// --- Default value functions for serde ---

fn default_name() -> String {
    "cadence".to_string()
}

fn default_event_channel_capacity() -> usize {
    64
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}
