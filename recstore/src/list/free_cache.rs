use crate::slot::slot_index::SlotIndex;

pub const MIN_CACHE_SLOTS: usize = 16;

#[derive(Debug, Clone)]
pub struct FreeSlotCache {
    slots: Vec<SlotIndex>,
    capacity: usize,
}

impl FreeSlotCache {
    pub fn for_entries(max_entries: usize) -> Self {
        let capacity = (max_entries / 16).max(MIN_CACHE_SLOTS);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns false, dropping `index`, when the cache is already full.
    pub fn push(&mut self, index: SlotIndex) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots.push(index);
        true
    }

    pub fn pop(&mut self) -> Option<SlotIndex> {
        self.slots.pop()
    }

    pub fn contains(&self, index: SlotIndex) -> bool {
        self.slots.contains(&index)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.slots.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_floor_and_scaling() {
        assert_eq!(FreeSlotCache::for_entries(0).capacity(), 16);
        assert_eq!(FreeSlotCache::for_entries(100).capacity(), 16);
        assert_eq!(FreeSlotCache::for_entries(271).capacity(), 16);
        assert_eq!(FreeSlotCache::for_entries(272).capacity(), 17);
        assert_eq!(FreeSlotCache::for_entries(16_000).capacity(), 1000);
    }

    #[test]
    fn bounded_push() {
        let mut cache = FreeSlotCache::for_entries(10);
        for i in 0..16 {
            assert!(cache.push(SlotIndex(i)));
        }
        assert!(cache.is_full());
        assert!(!cache.push(SlotIndex(99)));
        assert!(!cache.contains(SlotIndex(99)));
        assert_eq!(cache.len(), 16);
    }

    #[test]
    fn pops_most_recent_first() {
        let mut cache = FreeSlotCache::for_entries(10);
        cache.push(SlotIndex(3));
        cache.push(SlotIndex(8));
        assert_eq!(cache.pop(), Some(SlotIndex(8)));
        assert_eq!(cache.iter().collect::<Vec<_>>(), vec![SlotIndex(3)]);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.pop(), None);
    }
}
