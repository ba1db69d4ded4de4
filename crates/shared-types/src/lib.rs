//! # Shared Types Crate
//!
//! Identifiers and wire messages used by every Rum node crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: block, transaction and exchange envelope
//!   layouts are defined once, here.
//! - **Field-tagged encoding**: every wire and storage record derives
//!   `prost::Message`, so unknown fields from newer peers are skipped rather
//!   than rejected.
//! - **Opaque identifiers**: group, block and transaction ids are plain
//!   strings; peer identities are wrapped in [`PeerId`].

pub mod entities;
pub mod errors;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use wire::*;
