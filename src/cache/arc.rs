//! Adaptive Replacement Cache.
//!
//! Two partitioned LRU lists: L1 captures recency, L2 frequency. Each
//! list has a resident "top" half and a ghost "bottom" half holding
//! recently evicted entries. A hit in a ghost half shifts the adaptation
//! parameter `p`, growing the side that would have kept the entry.

use super::lru::LruCache;

/// Resident plus ghost halves of one ARC list.
#[derive(Debug)]
struct PartitionedLru<V> {
    top: LruCache<V>,
    bottom: LruCache<V>,
}

impl<V> PartitionedLru<V> {
    fn new(capacity: usize) -> Self {
        Self {
            top: LruCache::new(capacity),
            bottom: LruCache::new(capacity),
        }
    }

    /// Insert into the resident half; an evicted entry falls into the
    /// ghost half.
    fn put(&mut self, key: u32, value: V) {
        if let Some((old_key, old_value)) = self.top.put(key, value) {
            self.bottom.put(old_key, old_value);
        }
    }
}

/// ARC over packed IPv4 keys.
#[derive(Debug)]
pub struct ArcCache<V> {
    l1: PartitionedLru<V>,
    l2: PartitionedLru<V>,
    /// Target size of the L1 resident half, in [0, cap].
    p: usize,
    cap: usize,
}

impl<V: Clone> ArcCache<V> {
    /// Create a cache where each list gets half the total capacity.
    pub fn new(capacity: usize) -> Self {
        let half = capacity / 2;
        Self {
            l1: PartitionedLru::new(half),
            l2: PartitionedLru::new(half),
            p: half,
            cap: half,
        }
    }

    /// Look up a key, applying the ARC case rules on a hit.
    pub fn get(&mut self, key: u32) -> Option<V> {
        // Case I: resident hit in L1 graduates to the frequency list.
        if let Some(value) = self.l1.top.get(key).cloned() {
            self.l1.top.remove(key);
            self.l2.put(key, value.clone());
            return Some(value);
        }

        // Case II: ghost hit in B1; the recency side deserved more room.
        if let Some(value) = self.l1.bottom.get(key).cloned() {
            let b1 = self.l1.bottom.len();
            let b2 = self.l2.bottom.len();
            let delta = (b2 / b1).max(1);
            self.p = (self.p + delta).min(self.cap);
            self.l1.top.resize(self.p);
            self.l2.top.resize(self.cap - self.p);

            self.l1.bottom.remove(key);
            self.l2.put(key, value.clone());
            return Some(value);
        }

        // Resident hit in L2 needs no adaptation.
        if let Some(value) = self.l2.top.get(key).cloned() {
            return Some(value);
        }

        // Case III: ghost hit in B2; the frequency side deserved more room.
        if let Some(value) = self.l2.bottom.get(key).cloned() {
            let b1 = self.l1.bottom.len();
            let b2 = self.l2.bottom.len();
            let delta = (b1 / b2).max(1);
            self.p = self.p.saturating_sub(delta);
            self.l1.top.resize(self.p);
            self.l2.top.resize(self.cap - self.p);

            self.l2.bottom.remove(key);
            self.l2.put(key, value.clone());
            return Some(value);
        }

        None
    }

    /// Insert a key into the recency list.
    pub fn put(&mut self, key: u32, value: V) {
        self.l1.put(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_on_empty() {
        let mut cache: ArcCache<String> = ArcCache::new(4);
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn test_repeated_key_hits() {
        let mut cache = ArcCache::new(4);
        assert!(cache.get(1).is_none());
        cache.put(1, "a".to_string());
        // First re-access graduates the key from L1 to L2, later
        // accesses hit the frequency list.
        assert_eq!(cache.get(1), Some("a".to_string()));
        cache.put(1, "a".to_string());
        assert_eq!(cache.get(1), Some("a".to_string()));
        assert_eq!(cache.get(1), Some("a".to_string()));
    }

    #[test]
    fn test_eviction_from_l1_lands_in_ghost() {
        let mut cache = ArcCache::new(4); // each half gets 2
        cache.put(1, "a".to_string());
        cache.put(2, "b".to_string());
        cache.put(3, "c".to_string()); // evicts 1 from T1 to B1
        // Ghost hit still returns the value and adapts p.
        assert_eq!(cache.get(1), Some("a".to_string()));
    }

    #[test]
    fn test_cycling_beyond_capacity_misses() {
        let mut cache = ArcCache::new(4);
        // Cycle over more distinct keys than both ghost halves can
        // remember; the revisit is a cold miss.
        for key in 0..20u32 {
            assert!(cache.get(key).is_none());
            cache.put(key, key.to_string());
        }
        assert!(cache.get(0).is_none());
    }

    #[test]
    fn test_frequent_key_survives_scan() {
        let mut cache = ArcCache::new(8);
        // Establish 1 in the frequency list.
        cache.put(1, "hot".to_string());
        assert!(cache.get(1).is_some());
        cache.put(1, "hot".to_string());
        assert!(cache.get(1).is_some());

        // A short scan through cold keys does not displace it.
        for key in 100..104u32 {
            cache.get(key);
            cache.put(key, key.to_string());
        }
        assert_eq!(cache.get(1), Some("hot".to_string()));
    }
}
