//! Lifecycle events for the roster service
//!
//! Events are explicit and typed. Each is logged once, with the event
//! name in the `event` field so log pipelines can filter on it.

use std::fmt;

/// Observable lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Startup begins
    BootStart,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Storage backend opened
    StoreOpened,
    /// Seed document applied to the store
    SeedApplied,
    /// Ready to serve
    BootComplete,
    /// Startup aborted
    BootFailed,
    /// Server stopped
    ShutdownComplete,
}

impl Event {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::SeedApplied => "SEED_APPLIED",
            Event::BootComplete => "BOOT_COMPLETE",
            Event::BootFailed => "BOOT_FAILED",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
        }
    }

    /// Whether the event ends the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::BootFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
