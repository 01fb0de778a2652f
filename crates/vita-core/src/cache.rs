//! Sharded, fixed-capacity fitness cache.
//!
//! Grounded directly on spec §4.5 -- radiate has no equivalent (radiate
//! re-evaluates every individual every generation). An individual's
//! [`crate::signature::Signature`] keys a slot in one of `2^shards` shards,
//! each holding `2^k` open-addressed entries; a collision unconditionally
//! overwrites rather than chaining or probing, which is why the cache *can*
//! evict a still-useful entry but can never return a stale fitness for the
//! *wrong* signature: every slot stores the full signature alongside the
//! value and a lookup checks it before trusting the hit.
//!
//! `seal()` bumps the epoch, which invalidates every entry written before it
//! without walking the table -- used when a symbol set or objective
//! direction changes mid-process and every previously cached score becomes
//! meaningless.

use crate::signature::Signature;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::RwLock;

#[derive(Clone)]
struct Slot<V> {
    signature: Signature,
    value: V,
    epoch: u64,
    occupied: bool,
}

impl<V: Clone> Slot<V> {
    fn empty() -> Self
    where
        V: Default,
    {
        Slot { signature: Signature::ZERO, value: V::default(), epoch: 0, occupied: false }
    }
}

struct Shard<V> {
    slots: RwLock<Vec<Slot<V>>>,
    mask: u64,
}

/// Fixed-capacity, sharded, open-addressed cache mapping a structural
/// signature to a fitness value. No false positives: a lookup only returns
/// `Some` when the stored signature matches exactly and its epoch is at
/// least the cache's current seal.
pub struct FitnessCache<V: Clone + Default> {
    shards: Vec<Shard<V>>,
    shard_mask: u64,
    epoch: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone + Default> FitnessCache<V> {
    /// `slots_per_shard_pow2` and `shards_pow2` are both powers of two
    /// expressed as exponents: a cache with `shards_pow2 = 4` has 16 shards.
    pub fn new(shards_pow2: u32, slots_per_shard_pow2: u32) -> Self {
        let n_shards = 1usize << shards_pow2;
        let n_slots = 1usize << slots_per_shard_pow2;

        let shards = (0..n_shards)
            .map(|_| Shard {
                slots: RwLock::new(vec![Slot::empty(); n_slots]),
                mask: (n_slots as u64) - 1,
            })
            .collect();

        FitnessCache {
            shards,
            shard_mask: (n_shards as u64) - 1,
            epoch: AtomicU64::new(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn shard_for(&self, signature: &Signature) -> &Shard<V> {
        let folded = signature.fold64();
        let shard_idx = (folded >> 32) & self.shard_mask;
        &self.shards[shard_idx as usize]
    }

    fn slot_index(shard: &Shard<V>, signature: &Signature) -> usize {
        (signature.fold64() & shard.mask) as usize
    }

    pub fn get(&self, signature: &Signature) -> Option<V> {
        let shard = self.shard_for(signature);
        let idx = Self::slot_index(shard, signature);
        let current_epoch = self.epoch.load(AtomicOrdering::Acquire);

        let slots = shard.slots.read().unwrap();
        let slot = &slots[idx];
        if slot.occupied && slot.signature == *signature && slot.epoch >= current_epoch {
            self.hits.fetch_add(1, AtomicOrdering::Relaxed);
            Some(slot.value.clone())
        } else {
            self.misses.fetch_add(1, AtomicOrdering::Relaxed);
            None
        }
    }

    /// Inserts `value` at `signature`'s slot, unconditionally overwriting
    /// whatever was there -- a different signature hashing to the same slot
    /// is simply evicted, never chained.
    pub fn insert(&self, signature: Signature, value: V) {
        let shard = self.shard_for(&signature);
        let idx = Self::slot_index(shard, &signature);
        let current_epoch = self.epoch.load(AtomicOrdering::Acquire);

        let mut slots = shard.slots.write().unwrap();
        slots[idx] = Slot { signature, value, epoch: current_epoch, occupied: true };
    }

    /// Bumps the epoch, lazily invalidating every entry without touching the
    /// table: subsequent `get` calls on slots written before this point
    /// silently miss.
    pub fn seal(&self) {
        self.epoch.fetch_add(1, AtomicOrdering::AcqRel);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(AtomicOrdering::Relaxed) as f64;
        let misses = self.misses.load(AtomicOrdering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(AtomicOrdering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(AtomicOrdering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.shards.len() * (self.shards[0].mask as usize + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(n: u64) -> Signature {
        Signature(n, n.wrapping_mul(31))
    }

    #[test]
    fn round_trips_a_value() {
        let cache: FitnessCache<f64> = FitnessCache::new(2, 4);
        cache.insert(sig(1), 3.5);
        assert_eq!(cache.get(&sig(1)), Some(3.5));
    }

    #[test]
    fn miss_on_unknown_signature() {
        let cache: FitnessCache<f64> = FitnessCache::new(2, 4);
        assert_eq!(cache.get(&sig(99)), None);
    }

    #[test]
    fn no_false_positive_on_collision() {
        let cache: FitnessCache<f64> = FitnessCache::new(1, 1);
        cache.insert(sig(1), 1.0);
        cache.insert(sig(2), 2.0);
        let a = cache.get(&sig(1));
        let b = cache.get(&sig(2));
        assert!(a == Some(1.0) || a.is_none());
        assert!(b == Some(2.0) || b.is_none());
        assert_ne!((a, b), (Some(1.0), Some(1.0)));
    }

    #[test]
    fn seal_invalidates_prior_entries() {
        let cache: FitnessCache<f64> = FitnessCache::new(1, 2);
        cache.insert(sig(5), 9.0);
        assert_eq!(cache.get(&sig(5)), Some(9.0));
        cache.seal();
        assert_eq!(cache.get(&sig(5)), None);
    }

    #[test]
    fn hit_rate_tracks_get_outcomes() {
        let cache: FitnessCache<f64> = FitnessCache::new(1, 4);
        cache.insert(sig(1), 1.0);
        cache.get(&sig(1));
        cache.get(&sig(2));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert!((cache.hit_rate() - 0.5).abs() < 1e-9);
    }
}
