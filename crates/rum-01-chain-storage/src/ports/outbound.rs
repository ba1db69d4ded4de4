//! # Outbound Ports (Driven Ports)
//!
//! The key-value store the chain storage engine is written against.

use crate::domain::errors::KVStoreError;

/// Visitor passed to [`KeyValueStore::prefix_foreach`].
pub type PrefixVisitor<'a> = dyn FnMut(&[u8], &[u8]) -> Result<(), KVStoreError> + 'a;

/// Predicate passed to [`KeyValueStore::prefix_cond_delete`].
pub type DeletePredicate<'a> = dyn Fn(&[u8], &[u8]) -> Result<bool, KVStoreError> + 'a;

/// Abstract interface for key-value database operations.
///
/// Implementations lock internally (single writer, concurrent readers), so
/// every method takes `&self` and the store is shared as
/// `Arc<dyn KeyValueStore>`.
///
/// Production: `RocksDbStore` (node-runtime/adapters/storage/rocksdb_adapter.rs)
/// Testing: [`crate::InMemoryKVStore`]
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// Visit every entry under `prefix` in lexicographic key order.
    ///
    /// The first visitor error stops the iteration and is returned.
    fn prefix_foreach(&self, prefix: &[u8], visit: &mut PrefixVisitor<'_>)
        -> Result<(), KVStoreError>;

    /// Delete every entry under `prefix` atomically. Returns the count removed.
    fn prefix_delete(&self, prefix: &[u8]) -> Result<usize, KVStoreError>;

    /// Delete the entries under `prefix` the predicate accepts.
    ///
    /// A predicate error aborts the call before anything is deleted.
    fn prefix_cond_delete(
        &self,
        prefix: &[u8],
        predicate: &DeletePredicate<'_>,
    ) -> Result<usize, KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// ## Atomicity
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Collect every entry under `prefix` in key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let mut entries = Vec::new();
        self.prefix_foreach(prefix, &mut |k, v| {
            entries.push((k.to_vec(), v.to_vec()));
            Ok(())
        })?;
        Ok(entries)
    }
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}
