//! Fixed-capacity LRU cache.
//!
//! A HashMap index over a slab-allocated doubly linked recency list.
//! The head of the list is the most recently used entry, the tail the
//! least recently used; `get` promotes, `put` evicts from the tail.

use std::collections::HashMap;

#[derive(Debug)]
struct Entry<V> {
    key: u32,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU cache keyed by packed IPv4 addresses.
#[derive(Debug)]
pub struct LruCache<V> {
    map: HashMap<u32, usize>,
    slots: Vec<Option<Entry<V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    capacity: usize,
}

impl<V> LruCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity. Takes effect on subsequent puts; entries
    /// already over the new bound are evicted as inserts arrive.
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Look up a key, promoting it to most recently used on a hit.
    pub fn get(&mut self, key: u32) -> Option<&V> {
        let slot = *self.map.get(&key)?;
        self.promote(slot);
        self.slots[slot].as_ref().map(|entry| &entry.value)
    }

    /// Insert or update a key.
    ///
    /// Updating an existing key promotes it and returns `None`. A fresh
    /// insert evicts from the tail until there is room and returns the
    /// first evicted entry, if any.
    pub fn put(&mut self, key: u32, value: V) -> Option<(u32, V)> {
        if let Some(&slot) = self.map.get(&key) {
            self.promote(slot);
            if let Some(entry) = self.slots[slot].as_mut() {
                entry.value = value;
            }
            return None;
        }

        if self.capacity == 0 {
            return None;
        }

        let mut first_evicted = None;
        while self.map.len() >= self.capacity {
            match self.pop_lru() {
                Some(evicted) => {
                    if first_evicted.is_none() {
                        first_evicted = Some(evicted);
                    }
                }
                None => break,
            }
        }

        let slot = self.allocate(Entry {
            key,
            value,
            prev: None,
            next: None,
        });
        self.attach_front(slot);
        self.map.insert(key, slot);

        first_evicted
    }

    /// Remove and return the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(u32, V)> {
        let slot = self.tail?;
        self.detach(slot);
        let entry = self.slots[slot].take()?;
        self.map.remove(&entry.key);
        self.free.push(slot);
        Some((entry.key, entry.value))
    }

    /// Remove a key, returning its value if present.
    pub fn remove(&mut self, key: u32) -> Option<V> {
        let slot = self.map.remove(&key)?;
        self.detach(slot);
        let entry = self.slots[slot].take()?;
        self.free.push(slot);
        Some(entry.value)
    }

    fn allocate(&mut self, entry: Entry<V>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                slot
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        }
    }

    /// Unlink a slot from the recency list without freeing it.
    fn detach(&mut self, slot: usize) {
        let (prev, next) = match &self.slots[slot] {
            Some(entry) => (entry.prev, entry.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(entry) = self.slots[p].as_mut() {
                    entry.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(entry) = self.slots[n].as_mut() {
                    entry.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(entry) = self.slots[slot].as_mut() {
            entry.prev = None;
            entry.next = None;
        }
    }

    /// Link a detached slot in as the new head.
    fn attach_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(entry) = self.slots[slot].as_mut() {
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(entry) = self.slots[h].as_mut() {
                    entry.prev = Some(slot);
                }
            }
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn promote(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }
        self.detach(slot);
        self.attach_front(slot);
    }
}
