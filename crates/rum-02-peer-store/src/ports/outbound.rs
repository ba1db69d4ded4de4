//! # Outbound Ports (Driven Ports)

use std::time::Instant;

/// Monotonic time source.
///
/// Production: [`crate::SystemClock`]
/// Testing: [`crate::ManualClock`], advanced by hand
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}
