//! # Ports Layer
//!
//! - `outbound.rs` - Time source used for TTLs and bucket refill

pub mod outbound;
