use crate::backend::{ReadMode, SlotBackend};
use crate::error::RecordError;
use crate::list::free_cache::FreeSlotCache;
use crate::list::record::Record;
use crate::sequence::chain::Chain;
use crate::sequence::hooks::{Admission, SequenceHooks};
use crate::slot::codec::{SlotCodec, SlotState, is_uniform};
use crate::slot::constants::FREE_BYTE;
use crate::slot::slot_index::SlotIndex;
use tracing::{debug, info, warn};

/// Lists with more slots than this recover in reverse slot order.
pub const PREPEND_THRESHOLD: usize = 1000;

#[derive(Debug)]
pub(crate) struct SlotBook {
    pub(crate) max_entries: usize,
    pub(crate) available: usize,
    pub(crate) deleted: usize,
    pub(crate) errors: usize,
    pub(crate) evicted: usize,
    pub(crate) cache: FreeSlotCache,
    bound: Vec<bool>,
}

impl SlotBook {
    pub(crate) fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            available: 0,
            deleted: 0,
            errors: 0,
            evicted: 0,
            cache: FreeSlotCache::for_entries(max_entries),
            bound: vec![false; max_entries],
        }
    }

    pub(crate) fn is_bound(&self, index: SlotIndex) -> bool {
        self.bound.get(index.get()).copied().unwrap_or(false)
    }

    fn set_bound(&mut self, index: SlotIndex, bound: bool) {
        if let Some(b) = self.bound.get_mut(index.get()) {
            *b = bound;
        }
    }
}

pub(crate) struct Allocator<'a, S> {
    pub(crate) codec: &'a SlotCodec,
    pub(crate) backend: &'a mut S,
    pub(crate) book: &'a mut SlotBook,
}

impl<S: SlotBackend> Allocator<'_, S> {
    /// Classifies every slot, re-admitting valid ones into `records` and
    /// clearing corrupted ones. A slot that cannot be read is counted as
    /// deleted and never written.
    pub(crate) fn recover(&mut self, records: &mut Chain<Record>) {
        let prepend = self.book.max_entries > PREPEND_THRESHOLD;
        let cleared = self.codec.deleted_pattern();

        for i in 0..self.book.max_entries {
            let index = SlotIndex(i);
            let Some(bytes) = self.backend.read_slot(self.codec, index, ReadMode::Recovery) else {
                // contents unseen; left as is until reclaim can read it
                warn!(slot = ?index, "slot unreadable during recovery");
                self.book.errors += 1;
                self.book.deleted += 1;
                continue;
            };
            match self.codec.classify(&bytes) {
                SlotState::Valid => {
                    let record = Record::persisted(self.codec.payload(&bytes).to_vec(), index);
                    self.book.set_bound(index, true);
                    if prepend {
                        records.restore_front(record);
                    } else {
                        records.restore_back(record);
                    }
                }
                SlotState::Deleted => self.book.deleted += 1,
                SlotState::Free => {
                    self.book.available += 1;
                    self.book.cache.push(index);
                }
                SlotState::Corrupted => {
                    self.book.errors += 1;
                    self.book.deleted += 1;
                    warn!(slot = ?index, "corrupted slot, clearing");
                    if !self.backend.write_slot(self.codec, index, &cleared) {
                        warn!(slot = ?index, "clearing corrupted slot failed");
                    }
                }
            }
        }

        info!(
            max_entries = self.book.max_entries,
            live = records.len(),
            available = self.book.available,
            deleted = self.book.deleted,
            errors = self.book.errors,
            "recovery scan complete"
        );
    }

    /// Erases every unbound slot that does not validate and rebuilds the
    /// free counts and cache from what is on the device. Slots that cannot be
    /// read or erased stay counted as deleted. Returns the free slot count.
    pub(crate) fn reclaim_deleted(&mut self) -> usize {
        let erased = self.codec.free_pattern();
        self.book.cache.clear();
        let mut available = 0;
        let mut deleted = 0;

        for i in 0..self.book.max_entries {
            let index = SlotIndex(i);
            if self.book.is_bound(index) {
                continue;
            }
            let Some(bytes) = self.backend.read_slot(self.codec, index, ReadMode::Normal) else {
                warn!(slot = ?index, "slot unreadable during reclaim");
                deleted += 1;
                continue;
            };
            if self.codec.validate(&bytes) {
                continue;
            }
            if !is_uniform(&bytes, FREE_BYTE) && !self.backend.write_slot(self.codec, index, &erased)
            {
                warn!(slot = ?index, "erasing slot during reclaim failed");
                deleted += 1;
                continue;
            }
            available += 1;
            self.book.cache.push(index);
        }

        self.book.available = available;
        self.book.deleted = deleted;
        info!(
            available,
            deleted,
            cached = self.book.cache.len(),
            "reclaimed deleted slots"
        );
        available
    }

    /// Refills the cache with erased slots, stopping when it is full or once
    /// `available` of them were found. Returns the cached count.
    pub(crate) fn refill_cache(&mut self) -> usize {
        self.book.cache.clear();
        let mut found = 0;

        for i in 0..self.book.max_entries {
            if self.book.cache.is_full() || found >= self.book.available {
                break;
            }
            let index = SlotIndex(i);
            if self.book.is_bound(index) {
                continue;
            }
            let erased = self
                .backend
                .read_slot(self.codec, index, ReadMode::Normal)
                .is_some_and(|b| is_uniform(&b, FREE_BYTE));
            if erased {
                self.book.cache.push(index);
                found += 1;
            }
        }

        debug!(found, "refilled free-slot cache");
        self.book.cache.len()
    }

    /// Clears the record's slot. The slot is not reusable until the next
    /// reclaim pass.
    fn release(&mut self, record: &mut Record) -> Result<(), RecordError> {
        let Some(index) = record.slot() else {
            return Ok(());
        };
        if !self
            .backend
            .write_slot(self.codec, index, &self.codec.deleted_pattern())
        {
            return Err(RecordError::DeviceWrite(index));
        }
        record.unbind();
        self.book.set_bound(index, false);
        self.book.deleted += 1;
        debug!(slot = ?index, "slot cleared");
        Ok(())
    }
}

impl<S: SlotBackend> SequenceHooks<Record> for Allocator<'_, S> {
    type Error = RecordError;

    fn on_admit(&mut self, can_evict: bool) -> Result<Admission, RecordError> {
        if self.book.cache.is_empty() && self.book.available > 0 {
            self.refill_cache();
        }
        if self.book.cache.is_empty() && (self.book.deleted > 0 || self.book.available > 0) {
            self.reclaim_deleted();
        }

        if !self.book.cache.is_empty() {
            Ok(Admission::Ready)
        } else if can_evict {
            Ok(Admission::EvictOldest)
        } else {
            Err(RecordError::Exhausted)
        }
    }

    fn on_add(&mut self, record: &mut Record) -> Result<(), RecordError> {
        let bytes = self.codec.encode(record.data())?;
        let index = self.book.cache.pop().ok_or(RecordError::Exhausted)?;
        self.book.available = self.book.available.saturating_sub(1);

        if !self.backend.write_slot(self.codec, index, &bytes) {
            // contents unknown now; the next reclaim pass settles the slot
            self.book.deleted += 1;
            return Err(RecordError::DeviceWrite(index));
        }
        self.book.set_bound(index, true);
        record.bind(index);
        debug!(slot = ?index, "record persisted");
        Ok(())
    }

    fn on_remove(&mut self, record: &mut Record) -> Result<(), RecordError> {
        self.release(record)
    }

    fn on_update(&mut self, record: &mut Record) -> Result<(), RecordError> {
        self.release(record)
    }

    fn on_evict_oldest(&mut self, record: &mut Record) -> Result<(), RecordError> {
        let slot = record.slot();
        self.release(record)?;
        self.book.evicted += 1;
        warn!(slot = ?slot, "evicted oldest record to make room");
        Ok(())
    }
}
