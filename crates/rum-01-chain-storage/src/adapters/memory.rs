//! In-memory key-value store.
//!
//! Used by unit tests and by nodes configured without a persistent backend.

use std::collections::BTreeMap;
use std::ops::Bound;

use parking_lot::RwLock;

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, DeletePredicate, KeyValueStore, PrefixVisitor};

/// Ordered in-memory store.
///
/// A `BTreeMap` keeps keys sorted so prefix iteration is a range walk.
/// Visitors run on a snapshot taken under the read lock, so a visitor may
/// call back into the store.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

fn prefix_range<'a>(
    map: &'a BTreeMap<Vec<u8>, Vec<u8>>,
    prefix: &'a [u8],
) -> impl Iterator<Item = (&'a Vec<u8>, &'a Vec<u8>)> + 'a {
    map.range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
        .take_while(move |(k, _)| k.starts_with(prefix))
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        if key.is_empty() {
            return Err(KVStoreError::InvalidArgument {
                message: "empty key".to_string(),
            });
        }
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.write().remove(key);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.read().contains_key(key))
    }

    fn prefix_foreach(
        &self,
        prefix: &[u8],
        visit: &mut PrefixVisitor<'_>,
    ) -> Result<(), KVStoreError> {
        let snapshot: Vec<(Vec<u8>, Vec<u8>)> = {
            let data = self.data.read();
            prefix_range(&data, prefix)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        };
        for (key, value) in &snapshot {
            visit(key, value)?;
        }
        Ok(())
    }

    fn prefix_delete(&self, prefix: &[u8]) -> Result<usize, KVStoreError> {
        let mut data = self.data.write();
        let keys: Vec<Vec<u8>> = prefix_range(&data, prefix).map(|(k, _)| k.clone()).collect();
        for key in &keys {
            data.remove(key);
        }
        Ok(keys.len())
    }

    fn prefix_cond_delete(
        &self,
        prefix: &[u8],
        predicate: &DeletePredicate<'_>,
    ) -> Result<usize, KVStoreError> {
        let mut data = self.data.write();
        let mut doomed = Vec::new();
        for (key, value) in prefix_range(&data, prefix) {
            if predicate(key, value)? {
                doomed.push(key.clone());
            }
        }
        for key in &doomed {
            data.remove(key);
        }
        Ok(doomed.len())
    }

    fn batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        if operations.iter().any(|op| match op {
            BatchOperation::Put { key, .. } => key.is_empty(),
            BatchOperation::Delete { .. } => false,
        }) {
            return Err(KVStoreError::InvalidArgument {
                message: "empty key in batch".to_string(),
            });
        }
        let mut data = self.data.write();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}
