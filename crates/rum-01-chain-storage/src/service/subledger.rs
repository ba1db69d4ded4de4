//! Per-group sub-ledgers: transactions, producers, syncers, chain and app
//! configuration, nonces and the snapshot tag.

use prost::Message;
use shared_types::{Trx, TrxType};

use super::{decode_chunk, decode_record, encode_record, ChainStorage};
use crate::domain::entities::{
    AppConfigItem, AuthListEntry, AuthListType, GroupAction, ProducerItem, SyncerItem,
    TrxAuthMode, TrxStorageType,
};
use crate::domain::errors::ChainStorageError;
use crate::domain::keys;

impl ChainStorage {
    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    pub fn add_trx(&self, trx: &Trx) -> Result<(), ChainStorageError> {
        let key = keys::trx_key(&trx.group_id, &trx.trx_id, trx.nonce);
        self.db.set(&key, &trx.encode_to_vec())?;
        Ok(())
    }

    /// Look a transaction up on chain or inside cached blocks.
    ///
    /// Returns the transaction and every nonce it was stored under. On chain
    /// the highest nonce wins; in the cache the first block holding the trx
    /// wins.
    pub fn get_trx(
        &self,
        group_id: &str,
        trx_id: &str,
        storage: TrxStorageType,
    ) -> Result<(Trx, Vec<i64>), ChainStorageError> {
        let found = match storage {
            TrxStorageType::Chain => self.get_trx_on_chain(group_id, trx_id)?,
            TrxStorageType::Cache => self.get_trx_in_cache(group_id, trx_id)?,
        };
        found.ok_or_else(|| ChainStorageError::TrxNotFound {
            trx_id: trx_id.to_string(),
        })
    }

    fn get_trx_on_chain(
        &self,
        group_id: &str,
        trx_id: &str,
    ) -> Result<Option<(Trx, Vec<i64>)>, ChainStorageError> {
        let mut latest: Option<Trx> = None;
        let mut nonces = Vec::new();
        for (_, value) in self.db.prefix_scan(&keys::trx_id_prefix(group_id, trx_id))? {
            let trx = Trx::decode(value.as_slice())?;
            nonces.push(trx.nonce);
            if latest.as_ref().map_or(true, |t| trx.nonce > t.nonce) {
                latest = Some(trx);
            }
        }
        nonces.sort_unstable();
        Ok(latest.map(|trx| (trx, nonces)))
    }

    fn get_trx_in_cache(
        &self,
        group_id: &str,
        trx_id: &str,
    ) -> Result<Option<(Trx, Vec<i64>)>, ChainStorageError> {
        for (key, value) in self.db.prefix_scan(&keys::cached_block_prefix())? {
            let chunk = decode_chunk(&key, &value)?;
            let Some(block) = chunk.block else {
                continue;
            };
            if block.group_id != group_id {
                continue;
            }
            if let Some(trx) = block.trxs.into_iter().find(|t| t.trx_id == trx_id) {
                let nonce = trx.nonce;
                return Ok(Some((trx, vec![nonce])));
            }
        }
        Ok(None)
    }

    pub fn is_trx_exist(
        &self,
        group_id: &str,
        trx_id: &str,
        nonce: i64,
    ) -> Result<bool, ChainStorageError> {
        Ok(self.db.exists(&keys::trx_key(group_id, trx_id, nonce))?)
    }

    pub fn list_trx(&self, group_id: &str) -> Result<Vec<Trx>, ChainStorageError> {
        self.db
            .prefix_scan(&keys::trx_prefix(group_id))?
            .into_iter()
            .map(|(_, value)| Trx::decode(value.as_slice()).map_err(ChainStorageError::from))
            .collect()
    }

    // =========================================================================
    // PRODUCERS
    // =========================================================================

    pub fn add_producer(&self, item: &ProducerItem) -> Result<(), ChainStorageError> {
        let key = keys::producer_key(&item.group_id, &item.producer_pubkey);
        self.db.set(&key, &encode_record(item)?)?;
        tracing::debug!(
            "[rum-01] producer {} added to group {}",
            item.producer_pubkey,
            item.group_id
        );
        Ok(())
    }

    pub fn remove_producer(&self, group_id: &str, pubkey: &str) -> Result<(), ChainStorageError> {
        self.db.delete(&keys::producer_key(group_id, pubkey))?;
        Ok(())
    }

    pub fn get_producer(
        &self,
        group_id: &str,
        pubkey: &str,
    ) -> Result<Option<ProducerItem>, ChainStorageError> {
        self.db
            .get(&keys::producer_key(group_id, pubkey))?
            .map(|bytes| decode_record(&bytes))
            .transpose()
    }

    pub fn get_producers(&self, group_id: &str) -> Result<Vec<ProducerItem>, ChainStorageError> {
        self.db
            .prefix_scan(&keys::producer_prefix(group_id))?
            .iter()
            .map(|(_, value)| decode_record(value))
            .collect()
    }

    pub fn is_producer(&self, group_id: &str, pubkey: &str) -> Result<bool, ChainStorageError> {
        Ok(self.db.exists(&keys::producer_key(group_id, pubkey))?)
    }

    // =========================================================================
    // SYNCERS
    // =========================================================================

    /// Add or remove a syncer.
    ///
    /// ## Errors
    ///
    /// - `SyncerExists`: adding a syncer that is already registered
    /// - `SyncerNotFound`: removing a syncer that is not registered
    pub fn update_group_syncer(
        &self,
        item: &SyncerItem,
        action: GroupAction,
    ) -> Result<(), ChainStorageError> {
        let key = keys::syncer_key(&item.group_id, &item.syncer_pubkey);
        let exists = self.db.exists(&key)?;
        match action {
            GroupAction::Add => {
                if exists {
                    return Err(ChainStorageError::SyncerExists {
                        group_id: item.group_id.clone(),
                        pubkey: item.syncer_pubkey.clone(),
                    });
                }
                self.db.set(&key, &encode_record(item)?)?;
            }
            GroupAction::Remove => {
                if !exists {
                    return Err(ChainStorageError::SyncerNotFound {
                        group_id: item.group_id.clone(),
                        pubkey: item.syncer_pubkey.clone(),
                    });
                }
                self.db.delete(&key)?;
            }
        }
        Ok(())
    }

    pub fn get_syncer(
        &self,
        group_id: &str,
        pubkey: &str,
    ) -> Result<Option<SyncerItem>, ChainStorageError> {
        self.db
            .get(&keys::syncer_key(group_id, pubkey))?
            .map(|bytes| decode_record(&bytes))
            .transpose()
    }

    pub fn get_syncers(&self, group_id: &str) -> Result<Vec<SyncerItem>, ChainStorageError> {
        self.db
            .prefix_scan(&keys::syncer_prefix(group_id))?
            .iter()
            .map(|(_, value)| decode_record(value))
            .collect()
    }

    pub fn is_syncer(&self, group_id: &str, pubkey: &str) -> Result<bool, ChainStorageError> {
        Ok(self.db.exists(&keys::syncer_key(group_id, pubkey))?)
    }

    // =========================================================================
    // CHAIN CONFIG
    // =========================================================================

    pub fn set_trx_auth_mode(
        &self,
        group_id: &str,
        trx_type: TrxType,
        mode: TrxAuthMode,
    ) -> Result<(), ChainStorageError> {
        self.db
            .set(&keys::trx_auth_key(group_id, trx_type), &encode_record(&mode)?)?;
        Ok(())
    }

    /// Auth mode of a trx type; `FollowDenyList` when never set.
    pub fn get_trx_auth_mode(
        &self,
        group_id: &str,
        trx_type: TrxType,
    ) -> Result<TrxAuthMode, ChainStorageError> {
        match self.db.get(&keys::trx_auth_key(group_id, trx_type))? {
            Some(bytes) => decode_record(&bytes),
            None => Ok(TrxAuthMode::default()),
        }
    }

    /// Add or remove an allow/deny rule keyed by the entry's pubkey.
    ///
    /// ## Errors
    ///
    /// - `KeyNotFound`: removing a rule that does not exist
    pub fn update_auth_list(
        &self,
        list: AuthListType,
        entry: &AuthListEntry,
        action: GroupAction,
    ) -> Result<(), ChainStorageError> {
        let key = auth_list_key(list, &entry.group_id, &entry.pubkey);
        match action {
            GroupAction::Add => self.db.set(&key, &encode_record(entry)?)?,
            GroupAction::Remove => {
                if !self.db.exists(&key)? {
                    return Err(ChainStorageError::KeyNotFound {
                        key: String::from_utf8_lossy(&key).into_owned(),
                    });
                }
                self.db.delete(&key)?;
            }
        }
        Ok(())
    }

    pub fn get_auth_list(
        &self,
        group_id: &str,
        list: AuthListType,
    ) -> Result<Vec<AuthListEntry>, ChainStorageError> {
        let prefix = match list {
            AuthListType::AllowList => keys::allow_list_prefix(group_id),
            AuthListType::DenyList => keys::deny_list_prefix(group_id),
        };
        self.db
            .prefix_scan(&prefix)?
            .iter()
            .map(|(_, value)| decode_record(value))
            .collect()
    }

    /// Whether `pubkey` may send transactions of `trx_type`.
    pub fn check_trx_type_auth(
        &self,
        group_id: &str,
        trx_type: TrxType,
        pubkey: &str,
    ) -> Result<bool, ChainStorageError> {
        let listed = |list: AuthListType| -> Result<bool, ChainStorageError> {
            match self.db.get(&auth_list_key(list, group_id, pubkey))? {
                Some(bytes) => Ok(decode_record::<AuthListEntry>(&bytes)?.covers(trx_type)),
                None => Ok(false),
            }
        };
        match self.get_trx_auth_mode(group_id, trx_type)? {
            TrxAuthMode::FollowAllowList => listed(AuthListType::AllowList),
            TrxAuthMode::FollowDenyList => Ok(!listed(AuthListType::DenyList)?),
        }
    }

    // =========================================================================
    // APP CONFIG
    // =========================================================================

    pub fn update_app_config(&self, item: &AppConfigItem) -> Result<(), ChainStorageError> {
        let key = keys::app_config_key(&item.group_id, &item.name);
        self.db.set(&key, &encode_record(item)?)?;
        Ok(())
    }

    pub fn remove_app_config(&self, group_id: &str, name: &str) -> Result<(), ChainStorageError> {
        let key = keys::app_config_key(group_id, name);
        if !self.db.exists(&key)? {
            return Err(ChainStorageError::KeyNotFound {
                key: String::from_utf8_lossy(&key).into_owned(),
            });
        }
        self.db.delete(&key)?;
        Ok(())
    }

    pub fn get_app_config(
        &self,
        group_id: &str,
        name: &str,
    ) -> Result<Option<AppConfigItem>, ChainStorageError> {
        self.db
            .get(&keys::app_config_key(group_id, name))?
            .map(|bytes| decode_record(&bytes))
            .transpose()
    }

    pub fn get_app_config_keys(&self, group_id: &str) -> Result<Vec<String>, ChainStorageError> {
        let prefix = keys::app_config_prefix(group_id);
        Ok(self
            .db
            .prefix_scan(&prefix)?
            .into_iter()
            .map(|(key, _)| String::from_utf8_lossy(&key[prefix.len()..]).into_owned())
            .collect())
    }

    // =========================================================================
    // NONCES & SNAPSHOT
    // =========================================================================

    pub fn next_nonce(&self, group_id: &str) -> Result<u64, ChainStorageError> {
        Ok(self.sequence(keys::nonce_key(group_id))?.next()?)
    }

    pub fn next_consensus_nonce(&self, group_id: &str) -> Result<u64, ChainStorageError> {
        Ok(self.sequence(keys::consensus_nonce_key(group_id))?.next()?)
    }

    pub fn update_snapshot_tag(&self, group_id: &str, tag: &[u8]) -> Result<(), ChainStorageError> {
        self.db.set(&keys::snapshot_key(group_id), tag)?;
        Ok(())
    }

    pub fn get_snapshot_tag(&self, group_id: &str) -> Result<Option<Vec<u8>>, ChainStorageError> {
        Ok(self.db.get(&keys::snapshot_key(group_id))?)
    }
}

fn auth_list_key(list: AuthListType, group_id: &str, pubkey: &str) -> Vec<u8> {
    match list {
        AuthListType::AllowList => keys::allow_list_key(group_id, pubkey),
        AuthListType::DenyList => keys::deny_list_key(group_id, pubkey),
    }
}
