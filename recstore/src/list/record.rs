use crate::slot::slot_index::SlotIndex;
use std::fmt;

/// A payload and the slot currently backing it, if any.
#[derive(Clone, PartialEq, Eq)]
pub struct Record {
    data: Vec<u8>,
    slot: Option<SlotIndex>,
}

impl Record {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self { data, slot: None }
    }

    pub(crate) fn persisted(data: Vec<u8>, slot: SlotIndex) -> Self {
        Self {
            data,
            slot: Some(slot),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn slot(&self) -> Option<SlotIndex> {
        self.slot
    }

    pub fn is_persisted(&self) -> bool {
        self.slot.is_some()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    pub(crate) fn bind(&mut self, slot: SlotIndex) {
        self.slot = Some(slot);
    }

    pub(crate) fn unbind(&mut self) -> Option<SlotIndex> {
        self.slot.take()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record(")?;
        match self.slot {
            Some(slot) => write!(f, "{:?}", slot)?,
            None => write!(f, "unbacked")?,
        }
        write!(f, ", ")?;
        for b in &self.data {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding() {
        let mut r = Record::new(vec![1, 2]);
        assert!(!r.is_persisted());
        r.bind(SlotIndex(4));
        assert_eq!(r.slot(), Some(SlotIndex(4)));
        assert_eq!(r.unbind(), Some(SlotIndex(4)));
        assert_eq!(r.unbind(), None);
    }

    #[test]
    fn record_format() {
        let r = Record::persisted(vec![0x01, 0xAB], SlotIndex(2));
        assert_eq!(format!("{:?}", r), "Record(Slot#2, 01ab)");
        assert_eq!(format!("{:?}", Record::new(vec![0xFF])), "Record(unbacked, ff)");
    }
}
