//! # Domain Layer
//!
//! Pure domain logic for the chain storage engine.
//!
//! ## Modules
//!
//! - `entities` - Sub-ledger records (producers, syncers, config, group items)
//! - `config` - Engine configuration
//! - `errors` - Domain and KV error types
//! - `keys` - Key schema shared by every namespace

pub mod config;
pub mod entities;
pub mod errors;
pub mod keys;
