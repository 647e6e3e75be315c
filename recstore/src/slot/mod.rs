pub mod checksum;
pub mod codec;
pub mod constants;
pub mod slot_index;
