//! # Wire Messages
//!
//! Field-tagged records exchanged between peers and persisted by the chain
//! storage engine. Tags are part of the protocol: never renumber a field,
//! only append new ones.

use prost::Message;

use crate::errors::WireError;

// =============================================================================
// CHAIN DATA
// =============================================================================

/// Transaction kinds. Used to scope per-type authorization rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum TrxType {
    Post = 0,
    Announce = 1,
    ProducerUpdate = 2,
    SyncerUpdate = 3,
    ChainConfig = 4,
    AppConfig = 5,
}

impl TrxType {
    /// Stable name used inside storage keys.
    pub fn as_key(&self) -> &'static str {
        match self {
            TrxType::Post => "POST",
            TrxType::Announce => "ANNOUNCE",
            TrxType::ProducerUpdate => "PRODUCER",
            TrxType::SyncerUpdate => "SYNCER",
            TrxType::ChainConfig => "CHAIN_CONFIG",
            TrxType::AppConfig => "APP_CONFIG",
        }
    }
}

/// A signed transaction belonging to one group.
#[derive(Clone, PartialEq, Message)]
pub struct Trx {
    #[prost(string, tag = "1")]
    pub trx_id: String,
    #[prost(string, tag = "2")]
    pub group_id: String,
    #[prost(enumeration = "TrxType", tag = "3")]
    pub trx_type: i32,
    #[prost(bytes = "vec", tag = "4")]
    pub data: Vec<u8>,
    #[prost(string, tag = "5")]
    pub sender_pubkey: String,
    #[prost(int64, tag = "6")]
    pub nonce: i64,
    #[prost(int64, tag = "7")]
    pub time_stamp: i64,
    #[prost(bytes = "vec", tag = "8")]
    pub sender_sign: Vec<u8>,
}

/// A block produced for one group. `prev_block_id` names the parent.
#[derive(Clone, PartialEq, Message)]
pub struct Block {
    #[prost(string, tag = "1")]
    pub group_id: String,
    #[prost(string, tag = "2")]
    pub block_id: String,
    #[prost(string, tag = "3")]
    pub prev_block_id: String,
    #[prost(string, tag = "4")]
    pub producer_pubkey: String,
    #[prost(int64, tag = "5")]
    pub time_stamp: i64,
    #[prost(message, repeated, tag = "6")]
    pub trxs: Vec<Trx>,
    #[prost(bytes = "vec", tag = "7")]
    pub signature: Vec<u8>,
}

/// Stored record for one block, carrying the DAG links next to the payload.
///
/// Confirmed chunks have `height >= 0` and a parent id (empty for genesis);
/// cached chunks have `height == -1` and an empty parent id.
#[derive(Clone, PartialEq, Message)]
pub struct BlockChunk {
    #[prost(string, tag = "1")]
    pub block_id: String,
    #[prost(message, optional, tag = "2")]
    pub block: Option<Block>,
    #[prost(string, tag = "3")]
    pub parent_block_id: String,
    #[prost(int64, tag = "4")]
    pub height: i64,
    #[prost(string, repeated, tag = "5")]
    pub sub_block_ids: Vec<String>,
}

/// Height sentinel for chunks whose position in the chain is unknown.
pub const CACHED_HEIGHT: i64 = -1;

impl BlockChunk {
    pub fn cached(block: Block) -> Self {
        Self {
            block_id: block.block_id.clone(),
            block: Some(block),
            parent_block_id: String::new(),
            height: CACHED_HEIGHT,
            sub_block_ids: Vec::new(),
        }
    }

    pub fn confirmed(block: Block, parent_block_id: impl Into<String>, height: i64) -> Self {
        Self {
            block_id: block.block_id.clone(),
            block: Some(block),
            parent_block_id: parent_block_id.into(),
            height,
            sub_block_ids: Vec::new(),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.height == CACHED_HEIGHT
    }

    /// Record a child id. Returns `false` if the child was already linked.
    pub fn link_child(&mut self, child_id: &str) -> bool {
        if self.sub_block_ids.iter().any(|id| id == child_id) {
            return false;
        }
        self.sub_block_ids.push(child_id.to_string());
        true
    }

    pub fn group_id(&self) -> Option<&str> {
        self.block.as_ref().map(|b| b.group_id.as_str())
    }
}

// =============================================================================
// EXCHANGE ENVELOPES
// =============================================================================

/// Payload kinds carried inside a [`Package`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum PackageType {
    Trx = 0,
    Block = 1,
}

/// Chain data container: an encoded [`Trx`] or [`Block`].
#[derive(Clone, PartialEq, Message)]
pub struct Package {
    #[prost(enumeration = "PackageType", tag = "1")]
    pub package_type: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

/// Decoded content of a [`Package`].
#[derive(Debug, Clone, PartialEq)]
pub enum PackagePayload {
    Trx(Trx),
    Block(Block),
}

impl PackagePayload {
    pub fn group_id(&self) -> &str {
        match self {
            PackagePayload::Trx(trx) => &trx.group_id,
            PackagePayload::Block(block) => &block.group_id,
        }
    }
}

impl Package {
    pub fn from_trx(trx: &Trx) -> Self {
        Self {
            package_type: PackageType::Trx as i32,
            data: trx.encode_to_vec(),
        }
    }

    pub fn from_block(block: &Block) -> Self {
        Self {
            package_type: PackageType::Block as i32,
            data: block.encode_to_vec(),
        }
    }

    pub fn decode_payload(&self) -> Result<PackagePayload, WireError> {
        let kind = PackageType::try_from(self.package_type)
            .map_err(|_| WireError::UnknownPackageType(self.package_type))?;
        match kind {
            PackageType::Trx => Ok(PackagePayload::Trx(Trx::decode(self.data.as_slice())?)),
            PackageType::Block => Ok(PackagePayload::Block(Block::decode(self.data.as_slice())?)),
        }
    }
}

/// Top-level exchange message kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum RumMsgType {
    RelayReq = 0,
    RelayResp = 1,
    IfConn = 2,
    ConnResp = 3,
    ChainData = 4,
}

/// Relay request/response body.
#[derive(Clone, PartialEq, Message)]
pub struct RelayItem {
    #[prost(string, tag = "1")]
    pub group_id: String,
    #[prost(string, tag = "2")]
    pub user_pubkey: String,
    #[prost(string, tag = "3")]
    pub relay_type: String,
    #[prost(int64, tag = "4")]
    pub duration: i64,
    #[prost(bytes = "vec", tag = "5")]
    pub sender_sign: Vec<u8>,
    #[prost(string, tag = "6")]
    pub memo: String,
}

/// Exchange envelope written to a stream as one length-delimited frame.
#[derive(Clone, PartialEq, Message)]
pub struct RumMsg {
    #[prost(enumeration = "RumMsgType", tag = "1")]
    pub msg_type: i32,
    #[prost(message, optional, tag = "2")]
    pub data_package: Option<Package>,
    #[prost(message, optional, tag = "3")]
    pub relay_req: Option<RelayItem>,
    #[prost(message, optional, tag = "4")]
    pub relay_resp: Option<RelayItem>,
}

impl RumMsg {
    pub fn chain_data(package: Package) -> Self {
        Self {
            msg_type: RumMsgType::ChainData as i32,
            data_package: Some(package),
            relay_req: None,
            relay_resp: None,
        }
    }

    pub fn relay_req(item: RelayItem) -> Self {
        Self {
            msg_type: RumMsgType::RelayReq as i32,
            data_package: None,
            relay_req: Some(item),
            relay_resp: None,
        }
    }

    pub fn relay_resp(item: RelayItem) -> Self {
        Self {
            msg_type: RumMsgType::RelayResp as i32,
            data_package: None,
            relay_req: None,
            relay_resp: Some(item),
        }
    }

    /// Decoded message type, or `None` for a tag this node does not know.
    pub fn kind(&self) -> Option<RumMsgType> {
        RumMsgType::try_from(self.msg_type).ok()
    }
}
