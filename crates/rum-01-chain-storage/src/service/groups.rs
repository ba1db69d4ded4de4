//! Group items, kept in the `groups` store.

use super::{decode_record, encode_record, ChainStorage};
use crate::domain::entities::GroupItem;
use crate::domain::errors::ChainStorageError;
use crate::domain::keys;

impl ChainStorage {
    /// Insert or replace the item of a group.
    pub fn add_group(&self, item: &GroupItem) -> Result<(), ChainStorageError> {
        self.groups
            .set(&keys::group_item_key(&item.group_id), &encode_record(item)?)?;
        tracing::info!("[rum-01] group {} ({}) saved", item.group_id, item.group_name);
        Ok(())
    }

    pub fn get_group(&self, group_id: &str) -> Result<GroupItem, ChainStorageError> {
        match self.groups.get(&keys::group_item_key(group_id))? {
            Some(bytes) => decode_record(&bytes),
            None => Err(ChainStorageError::GroupNotFound {
                group_id: group_id.to_string(),
            }),
        }
    }

    pub fn get_all_groups(&self) -> Result<Vec<GroupItem>, ChainStorageError> {
        self.groups
            .prefix_scan(&keys::group_item_prefix())?
            .iter()
            .map(|(_, value)| decode_record(value))
            .collect()
    }

    /// Drop the group item only; chain data stays until `remove_group_data`.
    pub fn remove_group(&self, group_id: &str) -> Result<(), ChainStorageError> {
        let key = keys::group_item_key(group_id);
        if !self.groups.exists(&key)? {
            return Err(ChainStorageError::GroupNotFound {
                group_id: group_id.to_string(),
            });
        }
        self.groups.delete(&key)?;
        Ok(())
    }
}
