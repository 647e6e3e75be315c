pub mod backend;
pub mod config;
pub mod device;
pub mod error;
pub mod list;
pub mod sequence;
pub mod slot;

pub use backend::mirror::Mirror;
pub use backend::single::Single;
pub use backend::split::Split;
pub use backend::{ReadMode, SlotBackend};
pub use config::RecordListConfig;
pub use device::backing_store::BackingStore;
pub use device::file_device::FileDevice;
pub use device::mem_device::MemDevice;
pub use error::RecordError;
pub use list::record::Record;
pub use list::record_list::{
    ListStats, PlainRecordList, RecordHandle, RecordList, RedundantRecordList, SplitRecordList,
};
pub use slot::codec::{SlotCodec, SlotState};
pub use slot::slot_index::SlotIndex;
