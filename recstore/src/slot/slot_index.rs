use std::fmt;

#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct SlotIndex(pub usize);

impl SlotIndex {
    pub fn get(self) -> usize {
        self.0
    }

    pub fn offset(self, entry_size: usize) -> u64 {
        self.0 as u64 * entry_size as u64
    }
}

impl fmt::Debug for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_offsets() {
        assert_eq!(SlotIndex(0).offset(6), 0);
        assert_eq!(SlotIndex(3).offset(6), 18);
        assert_eq!(
            SlotIndex(u32::MAX as usize).offset(66),
            u32::MAX as u64 * 66
        );
    }

    #[test]
    fn slot_index_format() {
        assert_eq!(format!("{:?}", SlotIndex(17)), "Slot#17");
    }

    #[test]
    fn slot_index_ordering() {
        assert!(SlotIndex(1) < SlotIndex(2));
        assert_eq!(SlotIndex(5).get(), 5);
    }
}
