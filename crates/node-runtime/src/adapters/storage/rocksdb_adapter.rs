//! # RocksDB Storage Adapter
//!
//! Persistent implementation of the chain storage `KeyValueStore`.
//!
//! - Atomic batch writes (WriteBatch), also used for prefix deletes
//! - Snappy compression
//! - Bloom filters for point lookups
//! - Optional fsync per write
//!
//! A node opens two instances, one for chain data and one for group items.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, WriteOptions, DB};
use rum_01_chain_storage::ports::outbound::{DeletePredicate, PrefixVisitor};
use rum_01_chain_storage::{BatchOperation, KVStoreError, KeyValueStore};

/// RocksDB tuning.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Block cache size in bytes (default: 256MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 64MB)
    pub write_buffer_size: usize,
    /// Maximum number of write buffers (default: 3)
    pub max_write_buffer_number: i32,
    /// Target file size for level-1 (default: 64MB)
    pub target_file_size_base: u64,
    /// fsync after each write
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/chain".to_string(),
            block_cache_size: 256 * 1024 * 1024,
            write_buffer_size: 64 * 1024 * 1024,
            max_write_buffer_number: 3,
            target_file_size_base: 64 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        }
    }

    /// Smaller buffers, no sync.
    pub fn for_testing(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            max_write_buffer_number: 2,
            target_file_size_base: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

pub struct RocksDbStore {
    db: Arc<RwLock<DB>>,
    config: RocksDbConfig,
}

fn io_error(op: &str, e: rocksdb::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: format!("RocksDB {} failed: {}", op, e),
    }
}

impl RocksDbStore {
    /// Open or create the database at `config.path`.
    pub fn open(config: RocksDbConfig) -> Result<Self, KVStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);
        opts.set_target_file_size_base(config.target_file_size_base);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &config.path).map_err(|e| KVStoreError::IOError {
            message: format!("Failed to open RocksDB at {}: {}", config.path, e),
        })?;
        tracing::info!("[node] opened RocksDB at {}", config.path);

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
            config,
        })
    }

    fn write_opts(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.config.sync_writes);
        opts
    }

    /// Entries under `prefix`, read under the lock.
    fn collect_prefix(db: &DB, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let mut entries = Vec::new();
        for item in db.iterator(IteratorMode::From(prefix, Direction::Forward)) {
            let (key, value) = item.map_err(|e| io_error("scan", e))?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(entries)
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.db.read().get(key).map_err(|e| io_error("get", e))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        if key.is_empty() {
            return Err(KVStoreError::InvalidArgument {
                message: "empty key".to_string(),
            });
        }
        let db = self.db.write();
        db.put_opt(key, value, &self.write_opts())
            .map_err(|e| io_error("put", e))
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        let db = self.db.write();
        db.delete_opt(key, &self.write_opts())
            .map_err(|e| io_error("delete", e))
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.db
            .read()
            .get_pinned(key)
            .map(|v| v.is_some())
            .map_err(|e| io_error("exists check", e))
    }

    fn prefix_foreach(
        &self,
        prefix: &[u8],
        visit: &mut PrefixVisitor<'_>,
    ) -> Result<(), KVStoreError> {
        // Visitors may call back into the store, so the lock is not held
        // while they run.
        let entries = {
            let db = self.db.read();
            Self::collect_prefix(&db, prefix)?
        };
        for (key, value) in &entries {
            visit(key, value)?;
        }
        Ok(())
    }

    fn prefix_delete(&self, prefix: &[u8]) -> Result<usize, KVStoreError> {
        let db = self.db.write();
        let entries = Self::collect_prefix(&db, prefix)?;
        let mut batch = WriteBatch::default();
        for (key, _) in &entries {
            batch.delete(key);
        }
        db.write_opt(batch, &self.write_opts())
            .map_err(|e| io_error("prefix delete", e))?;
        Ok(entries.len())
    }

    fn prefix_cond_delete(
        &self,
        prefix: &[u8],
        predicate: &DeletePredicate<'_>,
    ) -> Result<usize, KVStoreError> {
        let db = self.db.write();
        let entries = Self::collect_prefix(&db, prefix)?;
        let mut batch = WriteBatch::default();
        let mut removed = 0;
        for (key, value) in &entries {
            if predicate(key, value)? {
                batch.delete(key);
                removed += 1;
            }
        }
        db.write_opt(batch, &self.write_opts())
            .map_err(|e| io_error("conditional delete", e))?;
        Ok(removed)
    }

    fn batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let db = self.db.write();
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => batch.put(&key, &value),
                BatchOperation::Delete { key } => batch.delete(&key),
            }
        }
        db.write_opt(batch, &self.write_opts())
            .map_err(|e| io_error("batch write", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, RocksDbStore) {
        let dir = TempDir::new().unwrap();
        let store = RocksDbStore::open(RocksDbConfig::for_testing(dir.path())).unwrap();
        (dir, store)
    }

    #[test]
    fn test_basic_operations() {
        let (_dir, store) = open_temp();

        store.set(b"key1", b"value1").unwrap();
        assert_eq!(store.get(b"key1").unwrap(), Some(b"value1".to_vec()));
        assert!(store.exists(b"key1").unwrap());

        store.delete(b"key1").unwrap();
        assert_eq!(store.get(b"key1").unwrap(), None);
        store.delete(b"key1").unwrap();
    }

    #[test]
    fn test_empty_key_rejected() {
        let (_dir, store) = open_temp();
        assert!(matches!(
            store.set(b"", b"v"),
            Err(KVStoreError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_prefix_scan_is_ordered_and_bounded() {
        let (_dir, store) = open_temp();
        store.set(b"blk_b", b"2").unwrap();
        store.set(b"blk_a", b"1").unwrap();
        store.set(b"blkx", b"x").unwrap();
        store.set(b"trx_a", b"t").unwrap();

        let keys: Vec<Vec<u8>> = store
            .prefix_scan(b"blk_")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![b"blk_a".to_vec(), b"blk_b".to_vec()]);
    }

    #[test]
    fn test_visitor_can_read_back() {
        let (_dir, store) = open_temp();
        store.set(b"p_1", b"a").unwrap();
        store.set(b"p_2", b"b").unwrap();

        let mut seen = 0;
        store
            .prefix_foreach(b"p_", &mut |k, _| {
                assert!(store.exists(k)?);
                seen += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_prefix_delete_and_cond_delete() {
        let (_dir, store) = open_temp();
        for i in 0..4u8 {
            store.set(&[b'g', b'_', i], &[i]).unwrap();
        }
        store.set(b"h_0", b"keep").unwrap();

        let removed = store
            .prefix_cond_delete(b"g_", &|_, v| Ok(v[0] % 2 == 0))
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.prefix_scan(b"g_").unwrap().len(), 2);

        assert_eq!(store.prefix_delete(b"g_").unwrap(), 2);
        assert!(store.prefix_scan(b"g_").unwrap().is_empty());
        assert!(store.exists(b"h_0").unwrap());
    }

    #[test]
    fn test_failing_predicate_deletes_nothing() {
        let (_dir, store) = open_temp();
        store.set(b"g_1", b"1").unwrap();
        let err = store
            .prefix_cond_delete(b"g_", &|_, _| {
                Err(KVStoreError::CorruptionError {
                    message: "bad".into(),
                })
            })
            .unwrap_err();
        assert!(matches!(err, KVStoreError::CorruptionError { .. }));
        assert!(store.exists(b"g_1").unwrap());
    }

    #[test]
    fn test_batch_write() {
        let (_dir, store) = open_temp();
        store.set(b"old", b"x").unwrap();
        store
            .batch_write(vec![
                BatchOperation::put(b"a".to_vec(), b"1".to_vec()),
                BatchOperation::put(b"b".to_vec(), b"2".to_vec()),
                BatchOperation::delete(b"old".to_vec()),
            ])
            .unwrap();

        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get(b"b").unwrap(), Some(b"2".to_vec()));
        assert!(!store.exists(b"old").unwrap());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        {
            let store = RocksDbStore::open(RocksDbConfig::for_testing(dir.path())).unwrap();
            store.set(b"persist", b"yes").unwrap();
        }
        let store = RocksDbStore::open(RocksDbConfig::for_testing(dir.path())).unwrap();
        assert_eq!(store.get(b"persist").unwrap(), Some(b"yes".to_vec()));
    }
}
