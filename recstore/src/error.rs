use crate::slot::slot_index::SlotIndex;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("device read failed for {0:?}")]
    DeviceRead(SlotIndex),
    #[error("device write failed for {0:?}")]
    DeviceWrite(SlotIndex),
    #[error("checksum mismatch for {0:?}")]
    ChecksumMismatch(SlotIndex),
    #[error("{index:?} is outside the {max_entries} slots of this list")]
    OutOfRange {
        index: SlotIndex,
        max_entries: usize,
    },
    #[error("payload is {actual} bytes, records hold {expected}")]
    PayloadSize { expected: usize, actual: usize },
    #[error("handle does not refer to a live record")]
    UnknownHandle,
    #[error("no free slot and no record left to evict")]
    Exhausted,
    #[error("{0} backing stores given, expected 1..=16")]
    StoreCount(usize),
    #[error("backing store cannot hold a single {entry_size}-byte slot")]
    StoreTooSmall { entry_size: usize },
    #[error("records must hold at least one byte")]
    ZeroDataSize,
    #[error("list id {list_id:#06x} makes erased or cleared {data_size}-byte slots validate")]
    AmbiguousListId { list_id: u16, data_size: usize },
}
