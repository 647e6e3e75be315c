pub mod mirror;
pub mod single;
pub mod split;

use crate::error::RecordError;
use crate::slot::codec::SlotCodec;
use crate::slot::slot_index::SlotIndex;
use bytes::Bytes;

pub const MAX_STORES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Recovery,
    Normal,
}

pub trait SlotBackend {
    fn slot_capacity(&self, entry_size: usize) -> usize;

    /// Raw bytes of one slot, or `None` if the devices could not produce them.
    fn read_slot(&mut self, codec: &SlotCodec, index: SlotIndex, mode: ReadMode) -> Option<Bytes>;

    fn write_slot(&mut self, codec: &SlotCodec, index: SlotIndex, bytes: &[u8]) -> bool;
}

impl<S: SlotBackend + ?Sized> SlotBackend for Box<S> {
    fn slot_capacity(&self, entry_size: usize) -> usize {
        (**self).slot_capacity(entry_size)
    }

    fn read_slot(&mut self, codec: &SlotCodec, index: SlotIndex, mode: ReadMode) -> Option<Bytes> {
        (**self).read_slot(codec, index, mode)
    }

    fn write_slot(&mut self, codec: &SlotCodec, index: SlotIndex, bytes: &[u8]) -> bool {
        (**self).write_slot(codec, index, bytes)
    }
}

pub(crate) fn check_store_count(count: usize) -> Result<(), RecordError> {
    if (1..=MAX_STORES).contains(&count) {
        Ok(())
    } else {
        Err(RecordError::StoreCount(count))
    }
}
