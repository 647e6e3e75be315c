use crate::device::backing_store::{BackingStore, in_bounds};
use crate::slot::constants::FREE_BYTE;
use bytes::Bytes;

/// Fixed-size device held entirely in memory. Starts out erased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemDevice {
    buf: Vec<u8>,
}

impl MemDevice {
    pub fn new(size: usize) -> Self {
        Self {
            buf: vec![FREE_BYTE; size],
        }
    }

    pub fn from_bytes(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Raw access for tests that damage the medium underneath a list.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl BackingStore for MemDevice {
    fn read(&mut self, offset: u64, len: usize) -> Option<Bytes> {
        if !in_bounds(self.size(), offset, len) {
            return None;
        }
        let start = offset as usize;
        Some(Bytes::copy_from_slice(&self.buf[start..start + len]))
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> bool {
        if !in_bounds(self.size(), offset, data.len()) {
            return false;
        }
        let start = offset as usize;
        self.buf[start..start + data.len()].copy_from_slice(data);
        true
    }

    fn size(&self) -> u64 {
        self.buf.len() as u64
    }
}
