use crate::backend::mirror::Mirror;
use crate::backend::single::Single;
use crate::backend::split::Split;
use crate::backend::{ReadMode, SlotBackend};
use crate::config::RecordListConfig;
use crate::error::RecordError;
use crate::list::allocator::{Allocator, SlotBook};
use crate::list::record::Record;
use crate::sequence::chain::{Chain, Handle, Iter};
use crate::sequence::cursor::Cursor;
use crate::slot::codec::SlotCodec;
use crate::slot::slot_index::SlotIndex;
use bytes::Bytes;
use tracing::info;

pub type RecordHandle = Handle;

pub type PlainRecordList<B> = RecordList<Single<B>>;
pub type RedundantRecordList<B> = RecordList<Mirror<B>>;
pub type SplitRecordList<B> = RecordList<Split<B>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListStats {
    pub max_entries: usize,
    pub live: usize,
    pub available: usize,
    pub deleted: usize,
    pub errors: usize,
    pub evicted: usize,
    pub cached: usize,
}

/// Single-writer. A full list evicts its oldest record rather than refuse an
/// add.
pub struct RecordList<S> {
    codec: SlotCodec,
    backend: S,
    book: SlotBook,
    records: Chain<Record>,
}

impl<S: SlotBackend> RecordList<S> {
    pub fn open(backend: S, config: &RecordListConfig) -> Result<Self, RecordError> {
        let mut list = Self::unscanned(backend, config)?;
        let (mut alloc, records) = list.parts();
        alloc.recover(records);
        Ok(list)
    }

    pub fn format(backend: S, config: &RecordListConfig) -> Result<Self, RecordError> {
        let mut list = Self::unscanned(backend, config)?;
        let erased = list.codec.free_pattern();
        for i in 0..list.book.max_entries {
            let index = SlotIndex(i);
            if !list.backend.write_slot(&list.codec, index, &erased) {
                return Err(RecordError::DeviceWrite(index));
            }
            list.book.cache.push(index);
        }
        list.book.available = list.book.max_entries;
        info!(
            max_entries = list.book.max_entries,
            list_id = list.codec.list_id(),
            "formatted record list"
        );
        Ok(list)
    }

    fn unscanned(backend: S, config: &RecordListConfig) -> Result<Self, RecordError> {
        let codec = config.codec()?;
        let max_entries = backend.slot_capacity(codec.entry_size());
        if max_entries == 0 {
            return Err(RecordError::StoreTooSmall {
                entry_size: codec.entry_size(),
            });
        }
        Ok(Self {
            codec,
            backend,
            book: SlotBook::new(max_entries),
            records: Chain::new(),
        })
    }

    fn parts(&mut self) -> (Allocator<'_, S>, &mut Chain<Record>) {
        let Self {
            codec,
            backend,
            book,
            records,
        } = self;
        (
            Allocator {
                codec: &*codec,
                backend,
                book,
            },
            records,
        )
    }

    fn check_payload(&self, payload: &[u8]) -> Result<(), RecordError> {
        if payload.len() != self.codec.data_size() {
            return Err(RecordError::PayloadSize {
                expected: self.codec.data_size(),
                actual: payload.len(),
            });
        }
        Ok(())
    }

    pub fn add_first(&mut self, payload: &[u8]) -> Result<RecordHandle, RecordError> {
        self.check_payload(payload)?;
        let (mut alloc, records) = self.parts();
        records.push_front(Record::new(payload.to_vec()), &mut alloc)
    }

    /// Adds behind every existing record, i.e. as the next to be evicted.
    pub fn add_last(&mut self, payload: &[u8]) -> Result<RecordHandle, RecordError> {
        self.check_payload(payload)?;
        let (mut alloc, records) = self.parts();
        records.push_back(Record::new(payload.to_vec()), &mut alloc)
    }

    pub fn remove(&mut self, handle: RecordHandle) -> Result<Record, RecordError> {
        let (mut alloc, records) = self.parts();
        records
            .remove(handle, &mut alloc)?
            .ok_or(RecordError::UnknownHandle)
    }

    pub fn remove_oldest(&mut self) -> Result<Option<Record>, RecordError> {
        let (mut alloc, records) = self.parts();
        records.remove_oldest(&mut alloc)
    }

    /// Replaces a record's payload. The record moves to a new slot; the old
    /// slot is cleared first, so a failure part way leaves the record in
    /// memory without a backing slot.
    pub fn update(&mut self, handle: RecordHandle, payload: &[u8]) -> Result<(), RecordError> {
        self.check_payload(payload)?;
        let data = payload.to_vec();
        let (mut alloc, records) = self.parts();
        if records.update(handle, |r| r.set_data(data), &mut alloc)? {
            Ok(())
        } else {
            Err(RecordError::UnknownHandle)
        }
    }

    pub fn read(&mut self, index: SlotIndex) -> Result<Bytes, RecordError> {
        if index.get() >= self.book.max_entries {
            return Err(RecordError::OutOfRange {
                index,
                max_entries: self.book.max_entries,
            });
        }
        let bytes = self
            .backend
            .read_slot(&self.codec, index, ReadMode::Normal)
            .ok_or(RecordError::DeviceRead(index))?;
        if !self.codec.validate(&bytes) {
            return Err(RecordError::ChecksumMismatch(index));
        }
        Ok(bytes.slice(..self.codec.data_size()))
    }

    /// Turns every cleared or damaged slot back into a free one and
    /// recounts. Returns the number of free slots.
    pub fn reclaim_deleted(&mut self) -> usize {
        let (mut alloc, _) = self.parts();
        alloc.reclaim_deleted()
    }

    pub fn refill_cache(&mut self) -> usize {
        let (mut alloc, _) = self.parts();
        alloc.refill_cache()
    }

    /// Upper bound on slots a reclaim pass could hand out. Cleared slots are
    /// only verified by that pass, so this may overcount.
    pub fn free_count(&self) -> usize {
        self.book.available + self.book.deleted
    }

    pub fn stats(&self) -> ListStats {
        ListStats {
            max_entries: self.book.max_entries,
            live: self.records.len(),
            available: self.book.available,
            deleted: self.book.deleted,
            errors: self.book.errors,
            evicted: self.book.evicted,
            cached: self.book.cache.len(),
        }
    }

    pub fn get(&self, handle: RecordHandle) -> Option<&Record> {
        self.records.get(handle)
    }

    /// Newest to oldest.
    pub fn iter(&self) -> Iter<'_, Record> {
        self.records.iter()
    }

    pub fn cursor(&self) -> Cursor<'_, Record> {
        self.records.cursor_front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.book.max_entries
    }

    pub fn codec(&self) -> &SlotCodec {
        &self.codec
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Direct device access. Writing slots through it bypasses the list's
    /// accounting until the next reclaim pass or reopen.
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    #[cfg(test)]
    pub(crate) fn cached_slots(&self) -> Vec<SlotIndex> {
        self.book.cache.iter().collect()
    }
}
