//! Leased monotonic counters.
//!
//! The stored value is the big-endian `u64` ceiling of the current lease.
//! Values handed out are strictly increasing across restarts; whatever was
//! leased but unused when a process dies is skipped.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::KeyValueStore;

struct Lease {
    next: u64,
    leased: u64,
}

/// A counter backed by one store key, leasing `bandwidth` values per write.
pub struct Sequence {
    store: Arc<dyn KeyValueStore>,
    key: Vec<u8>,
    bandwidth: u64,
    lease: Mutex<Lease>,
}

impl Sequence {
    /// Open the sequence at `key` and take the first lease.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<Vec<u8>>,
        bandwidth: u64,
    ) -> Result<Self, KVStoreError> {
        let key = key.into();
        if key.is_empty() {
            return Err(KVStoreError::InvalidArgument {
                message: "sequence key cannot be empty".to_string(),
            });
        }
        if bandwidth == 0 {
            return Err(KVStoreError::InvalidArgument {
                message: "sequence bandwidth must be greater than zero".to_string(),
            });
        }
        let seq = Self {
            store,
            key,
            bandwidth,
            lease: Mutex::new(Lease { next: 0, leased: 0 }),
        };
        {
            let mut lease = seq.lease.lock();
            seq.update_lease(&mut lease)?;
        }
        Ok(seq)
    }

    fn read_ceiling(&self) -> Result<u64, KVStoreError> {
        match self.store.get(&self.key)? {
            None => Ok(0),
            Some(bytes) => {
                let raw: [u8; 8] =
                    bytes
                        .as_slice()
                        .try_into()
                        .map_err(|_| KVStoreError::CorruptionError {
                            message: format!(
                                "sequence {} holds {} bytes, expected 8",
                                String::from_utf8_lossy(&self.key),
                                bytes.len()
                            ),
                        })?;
                Ok(u64::from_be_bytes(raw))
            }
        }
    }

    fn update_lease(&self, lease: &mut Lease) -> Result<(), KVStoreError> {
        let current = self.read_ceiling()?;
        let ceiling = current.saturating_add(self.bandwidth);
        self.store.set(&self.key, &ceiling.to_be_bytes())?;
        lease.next = current;
        lease.leased = ceiling;
        Ok(())
    }

    /// Next value, taking a new lease when the current one is used up.
    pub fn next(&self) -> Result<u64, KVStoreError> {
        let mut lease = self.lease.lock();
        if lease.next >= lease.leased {
            self.update_lease(&mut lease)?;
        }
        let value = lease.next;
        lease.next += 1;
        Ok(value)
    }

    /// Give back the unused part of the lease.
    ///
    /// Writes `next` as the new ceiling only if nobody moved the stored
    /// ceiling since this sequence leased it.
    pub fn release(&self) -> Result<(), KVStoreError> {
        let mut lease = self.lease.lock();
        if self.read_ceiling()? == lease.leased {
            self.store.set(&self.key, &lease.next.to_be_bytes())?;
        }
        lease.leased = lease.next;
        Ok(())
    }
}
