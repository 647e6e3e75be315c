use crate::error::RecordError;
use crate::slot::checksum::slot_checksum;
use crate::slot::constants::{CHECKSUM_LEN, DELETED_BYTE, FREE_BYTE};
use crate::slot::slot_index::SlotIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Valid,
    Free,
    Deleted,
    Corrupted,
}

/// Slot layout for one logical list: `[payload][checksum]`, the checksum
/// stored in native byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCodec {
    data_size: usize,
    list_id: u16,
}

impl SlotCodec {
    pub fn new(data_size: usize, list_id: u16) -> Result<Self, RecordError> {
        if data_size == 0 {
            return Err(RecordError::ZeroDataSize);
        }
        let codec = Self { data_size, list_id };
        if codec.validate(&codec.free_pattern()) || codec.validate(&codec.deleted_pattern()) {
            return Err(RecordError::AmbiguousListId { list_id, data_size });
        }
        Ok(codec)
    }

    pub fn data_size(&self) -> usize {
        self.data_size
    }

    pub fn entry_size(&self) -> usize {
        self.data_size + CHECKSUM_LEN
    }

    pub fn list_id(&self) -> u16 {
        self.list_id
    }

    pub fn offset(&self, index: SlotIndex) -> u64 {
        index.offset(self.entry_size())
    }

    pub fn capacity(&self, device_size: u64) -> usize {
        (device_size / self.entry_size() as u64) as usize
    }

    pub fn checksum(&self, payload: &[u8]) -> u16 {
        slot_checksum(payload, self.list_id)
    }

    pub fn encode(&self, payload: &[u8]) -> Result<Vec<u8>, RecordError> {
        if payload.len() != self.data_size {
            return Err(RecordError::PayloadSize {
                expected: self.data_size,
                actual: payload.len(),
            });
        }
        let mut slot = Vec::with_capacity(self.entry_size());
        slot.extend_from_slice(payload);
        slot.extend_from_slice(&self.checksum(payload).to_ne_bytes());
        Ok(slot)
    }

    pub fn validate(&self, slot: &[u8]) -> bool {
        if slot.len() != self.entry_size() {
            return false;
        }
        let (payload, stored) = slot.split_at(self.data_size);
        let stored = u16::from_ne_bytes([stored[0], stored[1]]);
        self.checksum(payload) == stored
    }

    pub fn classify(&self, slot: &[u8]) -> SlotState {
        if self.validate(slot) {
            SlotState::Valid
        } else if is_uniform(slot, DELETED_BYTE) {
            SlotState::Deleted
        } else if is_uniform(slot, FREE_BYTE) {
            SlotState::Free
        } else {
            SlotState::Corrupted
        }
    }

    pub fn payload<'a>(&self, slot: &'a [u8]) -> &'a [u8] {
        &slot[..self.data_size.min(slot.len())]
    }

    pub fn free_pattern(&self) -> Vec<u8> {
        vec![FREE_BYTE; self.entry_size()]
    }

    pub fn deleted_pattern(&self) -> Vec<u8> {
        vec![DELETED_BYTE; self.entry_size()]
    }
}

pub(crate) fn is_uniform(bytes: &[u8], value: u8) -> bool {
    bytes.iter().all(|b| *b == value)
}
