//!
//! Logger of the gateway.
//!

pub mod config;
mod setup;

pub use setup::{setup, TelemetryGuard};
pub use tracing::{debug, error, info, instrument, warn, Level};

pub use self::config::{Log, LogConsole, LogFile, LogFormat};
