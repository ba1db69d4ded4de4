//! # Rum Telemetry
//!
//! Tracing subscriber setup and log macros shared by the node crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rum_telemetry::{init_tracing, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_tracing(&TelemetryConfig::from_env())?;
//!     rum_telemetry::log_event!(info, "node", "starting");
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUM_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `RUM_JSON_LOGS` | `false` | JSON output |
//! | `RUM_NETWORK` | `nevis` | Network name in the startup line |
//! | `RUM_SUBSYSTEM_ID` | `node` | Subsystem identifier |

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Span tagged with a subsystem.
///
/// ```rust,ignore
/// let _span = rum_telemetry::subsystem_span!("gather", subsystem = "rum-01", group = %group_id).entered();
/// ```
#[macro_export]
macro_rules! subsystem_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
