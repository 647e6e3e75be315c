use crate::backend::{ReadMode, SlotBackend};
use crate::device::backing_store::BackingStore;
use crate::slot::codec::SlotCodec;
use crate::slot::slot_index::SlotIndex;
use bytes::Bytes;

/// One device holding the whole slot array.
pub struct Single<B> {
    device: B,
}

impl<B: BackingStore> Single<B> {
    pub fn new(device: B) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &B {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut B {
        &mut self.device
    }

    pub fn into_inner(self) -> B {
        self.device
    }
}

impl<B: BackingStore> SlotBackend for Single<B> {
    fn slot_capacity(&self, entry_size: usize) -> usize {
        (self.device.size() / entry_size as u64) as usize
    }

    fn read_slot(&mut self, codec: &SlotCodec, index: SlotIndex, _mode: ReadMode) -> Option<Bytes> {
        self.device.read(codec.offset(index), codec.entry_size())
    }

    fn write_slot(&mut self, codec: &SlotCodec, index: SlotIndex, bytes: &[u8]) -> bool {
        self.device.write(codec.offset(index), bytes)
    }
}
