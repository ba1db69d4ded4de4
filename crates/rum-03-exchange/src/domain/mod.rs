//! Exchange domain: configuration, errors, framing and message routing.

pub mod config;
pub mod errors;
pub mod framing;
pub mod messages;

pub use config::{ExchangeConfig, MAX_MESSAGE_SIZE, REX_PROTOCOL_VERSION};
pub use errors::ExchangeError;
pub use framing::{read_msg, write_msg, ReadOutcome};
pub use messages::{HandlerName, MessageKind};
