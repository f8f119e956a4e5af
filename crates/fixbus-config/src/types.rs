//! Configuration types.
//!
//! Every struct implements [`Default`], so an empty file (or a bare
//! `[section]` header) yields a working configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default listener capacity for channels without an override.
pub const DEFAULT_CAPACITY: usize = 16;

/// Largest capacity a channel may be configured with.
pub const MAX_CHANNEL_CAPACITY: usize = 4096;

// ---------------------------------------------------------------------------
// Top-level BusConfig
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Channel capacities and overflow behaviour.
    pub channels: ChannelsSection,
    /// Logging and tracing configuration.
    pub logging: LoggingSection,
}

impl BusConfig {
    /// Effective settings for the channel called `name`.
    ///
    /// Fields missing from an override fall back to the section defaults.
    #[must_use]
    pub fn settings_for(&self, name: &str) -> ResolvedChannel {
        let defaults = ResolvedChannel {
            capacity: self.channels.capacity,
            overflow: self.channels.overflow,
        };
        match self.channels.overrides.get(name) {
            Some(o) => ResolvedChannel {
                capacity: o.capacity.unwrap_or(defaults.capacity),
                overflow: o.overflow.unwrap_or(defaults.overflow),
            },
            None => defaults,
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelsSection
// ---------------------------------------------------------------------------

/// `[channels]`: defaults plus per-channel overrides keyed by channel name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelsSection {
    /// Capacity for channels without an override.
    pub capacity: usize,
    /// Overflow behaviour for channels without an override.
    pub overflow: OverflowMode,
    /// `[channels.overrides.<Name>]` tables.
    pub overrides: BTreeMap<String, ChannelOverride>,
}

impl Default for ChannelsSection {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            overflow: OverflowMode::default(),
            overrides: BTreeMap::new(),
        }
    }
}

/// Settings for a single named channel. Unset fields inherit the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelOverride {
    /// Listener capacity.
    pub capacity: Option<usize>,
    /// Overflow behaviour.
    pub overflow: Option<OverflowMode>,
}

/// What a full channel does with a new registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowMode {
    /// Drop it quietly.
    #[default]
    Silent,
    /// Drop it and log a warning.
    Warn,
    /// Refuse it with an error.
    Reject,
}

impl OverflowMode {
    /// Lowercase name as used in TOML.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Warn => "warn",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for OverflowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverflowMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "warn" => Ok(Self::Warn),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unsupported overflow mode '{other}'; expected one of: silent, warn, reject"
            )),
        }
    }
}

/// Effective settings of one channel after applying overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedChannel {
    /// Listener capacity.
    pub capacity: usize,
    /// Overflow behaviour.
    pub overflow: OverflowMode,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"` or `"json"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["fixbus_events=trace"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
