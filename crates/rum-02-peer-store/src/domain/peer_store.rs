//! # Peer Store
//!
//! `(group_id, peer_id) -> deadline`. Entries past their deadline are
//! dropped whenever their group is read, and by `purge_expired`.
//!
//! Ignored peers are kept under the reserved group id
//! [`IGNORE_GROUP_ID`]; callers cannot save into it directly.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shared_types::{PeerId, IGNORE_GROUP_ID};

use crate::adapters::SystemClock;
use crate::domain::config::PeerStoreConfig;
use crate::domain::errors::PeerStoreError;
use crate::ports::outbound::Clock;

pub struct PeerStore {
    // BTreeMap keeps sampling input ordered, so a fixed seed gives fixed picks.
    groups: DashMap<String, BTreeMap<PeerId, Instant>>,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
    config: PeerStoreConfig,
}

impl PeerStore {
    pub fn new(config: PeerStoreConfig) -> Self {
        Self {
            groups: DashMap::new(),
            clock: Arc::new(SystemClock),
            rng: Mutex::new(StdRng::from_entropy()),
            config,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn config(&self) -> &PeerStoreConfig {
        &self.config
    }

    /// Record that `peer` serves `group_id` for the next `ttl`.
    pub fn save(&self, group_id: &str, peer: PeerId, ttl: Duration) {
        if group_id == IGNORE_GROUP_ID {
            tracing::warn!("[rum-02] refusing to save {} into the reserved ignore group", peer);
            return;
        }
        self.insert(group_id, peer, ttl);
    }

    fn insert(&self, group_id: &str, peer: PeerId, ttl: Duration) {
        let deadline = self.clock.now() + ttl;
        self.groups
            .entry(group_id.to_string())
            .or_default()
            .insert(peer, deadline);
    }

    /// Ignore `peer` for the configured ignore TTL.
    pub fn add_ignore_peer(&self, peer: PeerId) {
        tracing::debug!("[rum-02] ignoring peer {} for {:?}", peer, self.config.ignore_ttl);
        self.insert(IGNORE_GROUP_ID, peer, self.config.ignore_ttl);
    }

    pub fn is_ignored(&self, peer: &PeerId) -> bool {
        self.get(IGNORE_GROUP_ID).contains(peer)
    }

    /// Live peers of a group, in peer id order.
    pub fn get(&self, group_id: &str) -> Vec<PeerId> {
        let now = self.clock.now();
        match self.groups.get_mut(group_id) {
            Some(mut peers) => {
                peers.retain(|_, deadline| *deadline >= now);
                peers.keys().cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Up to `count` random live peers of the group that are not in
    /// `excluding`, topped up from `excluding` itself when the group is short.
    ///
    /// Ignored peers are never returned. A short result is not an error.
    pub fn get_random_peer(
        &self,
        group_id: &str,
        count: usize,
        excluding: &[PeerId],
    ) -> Vec<PeerId> {
        let ignored: HashSet<PeerId> = self.get(IGNORE_GROUP_ID).into_iter().collect();
        let excluded: HashSet<&PeerId> = excluding.iter().collect();
        let stored: Vec<PeerId> = self
            .get(group_id)
            .into_iter()
            .filter(|p| !excluded.contains(p) && !ignored.contains(p))
            .collect();

        let mut rng = self.rng.lock();
        let mut picked: Vec<PeerId> = stored.choose_multiple(&mut *rng, count).cloned().collect();

        if picked.len() < count {
            let mut pool: Vec<&PeerId> = excluding.iter().collect();
            pool.shuffle(&mut *rng);
            for peer in pool {
                if picked.len() == count {
                    break;
                }
                if ignored.contains(peer) || picked.contains(peer) {
                    continue;
                }
                picked.push(peer.clone());
            }
        }
        picked
    }

    /// One random connected peer that is not ignored.
    pub fn get_one_random_peer(&self, connected: &[PeerId]) -> Result<PeerId, PeerStoreError> {
        let ignored: HashSet<PeerId> = self.get(IGNORE_GROUP_ID).into_iter().collect();
        let usable: Vec<&PeerId> = connected.iter().filter(|p| !ignored.contains(*p)).collect();
        usable
            .choose(&mut *self.rng.lock())
            .map(|p| (*p).clone())
            .ok_or(PeerStoreError::NoAvailablePeer)
    }

    /// Drop expired entries in every group, and groups left empty.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        for mut group in self.groups.iter_mut() {
            let before = group.len();
            group.retain(|_, deadline| *deadline >= now);
            removed += before - group.len();
        }
        self.groups.retain(|_, peers| !peers.is_empty());
        if removed > 0 {
            tracing::debug!("[rum-02] purged {} expired peer entries", removed);
        }
        removed
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
