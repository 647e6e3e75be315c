use crate::backend::{ReadMode, SlotBackend, check_store_count};
use crate::device::backing_store::BackingStore;
use crate::error::RecordError;
use crate::slot::codec::SlotCodec;
use crate::slot::slot_index::SlotIndex;
use bytes::Bytes;
use tracing::{debug, warn};

pub struct Mirror<B> {
    replicas: Vec<B>,
    repaired: usize,
}

impl<B: BackingStore> Mirror<B> {
    pub fn new(replicas: Vec<B>) -> Result<Self, RecordError> {
        check_store_count(replicas.len())?;
        Ok(Self {
            replicas,
            repaired: 0,
        })
    }

    pub fn replicas(&self) -> &[B] {
        &self.replicas
    }

    pub fn replicas_mut(&mut self) -> &mut [B] {
        &mut self.replicas
    }

    pub fn into_replicas(self) -> Vec<B> {
        self.replicas
    }

    pub fn repaired(&self) -> usize {
        self.repaired
    }

    /// The last replica holding a valid copy is ground truth; every replica
    /// that failed validation gets that copy. When no replica validates and
    /// every replica was read, the slot is erased everywhere and reported as
    /// free. When no replica validates and some could not be read, nothing is
    /// written and the slot is reported unreadable.
    fn read_recovering(&mut self, codec: &SlotCodec, index: SlotIndex) -> Option<Bytes> {
        let offset = codec.offset(index);
        let len = codec.entry_size();

        let reads: Vec<Option<Bytes>> = self
            .replicas
            .iter_mut()
            .map(|r| r.read(offset, len))
            .collect();
        let valid: Vec<bool> = reads
            .iter()
            .map(|b| b.as_ref().is_some_and(|b| codec.validate(b)))
            .collect();

        let Some(truth) = valid.iter().rposition(|v| *v) else {
            if reads.iter().any(Option::is_none) {
                warn!(slot = ?index, "replica unreadable and no valid copy, leaving slot untouched");
                return None;
            }
            let free = codec.free_pattern();
            for (replica_no, replica) in self.replicas.iter_mut().enumerate() {
                if !replica.write(offset, &free) {
                    warn!(replica = replica_no, slot = ?index, "erasing invalid slot failed");
                }
            }
            debug!(slot = ?index, "no replica holds a valid copy, erased");
            return Some(Bytes::from(free));
        };
        let bytes = reads[truth].clone()?;

        for (replica_no, (replica, ok)) in self.replicas.iter_mut().zip(&valid).enumerate() {
            if *ok {
                continue;
            }
            if replica.write(offset, &bytes) {
                self.repaired += 1;
                warn!(replica = replica_no, from = truth, slot = ?index, "read-repaired replica");
            } else {
                warn!(replica = replica_no, slot = ?index, "read-repair write failed");
            }
        }
        Some(bytes)
    }

    fn read_first_valid(&mut self, codec: &SlotCodec, index: SlotIndex) -> Option<Bytes> {
        let offset = codec.offset(index);
        let len = codec.entry_size();
        for replica in self.replicas.iter_mut() {
            if let Some(bytes) = replica.read(offset, len) {
                if codec.validate(&bytes) {
                    return Some(bytes);
                }
            }
        }
        // best effort: replica 0's bytes, valid or not
        self.replicas[0].read(offset, len)
    }
}

impl<B: BackingStore> SlotBackend for Mirror<B> {
    /// Bounded by the smallest replica.
    fn slot_capacity(&self, entry_size: usize) -> usize {
        self.replicas
            .iter()
            .map(|r| (r.size() / entry_size as u64) as usize)
            .min()
            .unwrap_or(0)
    }

    fn read_slot(&mut self, codec: &SlotCodec, index: SlotIndex, mode: ReadMode) -> Option<Bytes> {
        match mode {
            ReadMode::Recovery => self.read_recovering(codec, index),
            ReadMode::Normal => self.read_first_valid(codec, index),
        }
    }

    /// Succeeds if any replica accepts the write, so success does not mean
    /// every copy was updated.
    fn write_slot(&mut self, codec: &SlotCodec, index: SlotIndex, bytes: &[u8]) -> bool {
        let offset = codec.offset(index);
        let mut accepted = 0;
        for (replica_no, replica) in self.replicas.iter_mut().enumerate() {
            if replica.write(offset, bytes) {
                accepted += 1;
            } else {
                warn!(replica = replica_no, slot = ?index, "replica rejected write");
            }
        }
        if accepted > 0 && accepted < self.replicas.len() {
            warn!(
                slot = ?index,
                accepted,
                replicas = self.replicas.len(),
                "write only partially replicated"
            );
        }
        accepted > 0
    }
}
