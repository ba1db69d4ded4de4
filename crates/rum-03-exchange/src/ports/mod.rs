//! Port definitions for the exchange service.

pub mod inbound;
pub mod outbound;
