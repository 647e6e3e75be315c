use bytes::Bytes;

/// Requests past `size()` fail instead of growing the device.
pub trait BackingStore {
    fn read(&mut self, offset: u64, len: usize) -> Option<Bytes>;
    fn write(&mut self, offset: u64, data: &[u8]) -> bool;
    fn size(&self) -> u64;
}

impl<B: BackingStore + ?Sized> BackingStore for Box<B> {
    fn read(&mut self, offset: u64, len: usize) -> Option<Bytes> {
        (**self).read(offset, len)
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> bool {
        (**self).write(offset, data)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

pub(crate) fn in_bounds(size: u64, offset: u64, len: usize) -> bool {
    offset
        .checked_add(len as u64)
        .is_some_and(|end| end <= size)
}
