//! Message kinds and the handler routes they map to.

use std::fmt;

use shared_types::RumMsgType;

/// Kind of a [`shared_types::RumMsg`], mirrored from its wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    RelayReq,
    RelayResp,
    IfConn,
    ConnResp,
    ChainData,
}

impl MessageKind {
    pub fn handler_name(self) -> HandlerName {
        match self {
            MessageKind::RelayReq | MessageKind::RelayResp => HandlerName::RumRelay,
            MessageKind::IfConn | MessageKind::ConnResp => HandlerName::RumSession,
            MessageKind::ChainData => HandlerName::RumChainData,
        }
    }

    pub fn to_wire(self) -> RumMsgType {
        match self {
            MessageKind::RelayReq => RumMsgType::RelayReq,
            MessageKind::RelayResp => RumMsgType::RelayResp,
            MessageKind::IfConn => RumMsgType::IfConn,
            MessageKind::ConnResp => RumMsgType::ConnResp,
            MessageKind::ChainData => RumMsgType::ChainData,
        }
    }
}

impl From<RumMsgType> for MessageKind {
    fn from(tag: RumMsgType) -> Self {
        match tag {
            RumMsgType::RelayReq => MessageKind::RelayReq,
            RumMsgType::RelayResp => MessageKind::RelayResp,
            RumMsgType::IfConn => MessageKind::IfConn,
            RumMsgType::ConnResp => MessageKind::ConnResp,
            RumMsgType::ChainData => MessageKind::ChainData,
        }
    }
}

/// Handler routes. Several kinds share one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerName {
    RumRelay,
    RumSession,
    RumChainData,
}

impl HandlerName {
    pub fn as_str(self) -> &'static str {
        match self {
            HandlerName::RumRelay => "rumrelay",
            HandlerName::RumSession => "rumsession",
            HandlerName::RumChainData => "rumchaindata",
        }
    }
}

impl fmt::Display for HandlerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
