use crate::backend::{ReadMode, SlotBackend, check_store_count};
use crate::device::backing_store::BackingStore;
use crate::error::RecordError;
use crate::slot::codec::SlotCodec;
use crate::slot::slot_index::SlotIndex;
use bytes::Bytes;

/// Device `i` owns the contiguous slot range that follows device `i - 1`'s.
pub struct Split<B> {
    shards: Vec<B>,
}

impl<B: BackingStore> Split<B> {
    pub fn new(shards: Vec<B>) -> Result<Self, RecordError> {
        check_store_count(shards.len())?;
        Ok(Self { shards })
    }

    pub fn shards(&self) -> &[B] {
        &self.shards
    }

    pub fn shards_mut(&mut self) -> &mut [B] {
        &mut self.shards
    }

    pub fn into_shards(self) -> Vec<B> {
        self.shards
    }

    /// The shard holding `index` and the slot's position within that shard.
    pub fn locate(&self, entry_size: usize, index: SlotIndex) -> Option<(usize, SlotIndex)> {
        let mut start = 0;
        for (shard_no, shard) in self.shards.iter().enumerate() {
            let cap = (shard.size() / entry_size as u64) as usize;
            if index.get() < start + cap {
                return Some((shard_no, SlotIndex(index.get() - start)));
            }
            start += cap;
        }
        None
    }
}

impl<B: BackingStore> SlotBackend for Split<B> {
    fn slot_capacity(&self, entry_size: usize) -> usize {
        self.shards
            .iter()
            .map(|s| (s.size() / entry_size as u64) as usize)
            .sum()
    }

    fn read_slot(&mut self, codec: &SlotCodec, index: SlotIndex, _mode: ReadMode) -> Option<Bytes> {
        let (shard_no, local) = self.locate(codec.entry_size(), index)?;
        self.shards[shard_no].read(codec.offset(local), codec.entry_size())
    }

    fn write_slot(&mut self, codec: &SlotCodec, index: SlotIndex, bytes: &[u8]) -> bool {
        match self.locate(codec.entry_size(), index) {
            Some((shard_no, local)) => self.shards[shard_no].write(codec.offset(local), bytes),
            None => false,
        }
    }
}
