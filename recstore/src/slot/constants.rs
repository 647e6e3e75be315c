pub const CHECKSUM_LEN: usize = 2;
pub const FREE_BYTE: u8 = 0xFF;
pub const DELETED_BYTE: u8 = 0x00;
