//! Integration flows.

pub mod peer_properties;
pub mod storage_properties;
pub mod sync_flows;
