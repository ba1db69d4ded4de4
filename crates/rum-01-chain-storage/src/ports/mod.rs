//! # Ports Layer
//!
//! Defines the port traits for the chain storage engine.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (API used by the exchange and node runtime)
//! - `outbound.rs` - Driven ports (the key-value store the engine runs on)

pub mod inbound;
pub mod outbound;
