use crate::error::RecordError;
use crate::slot::codec::SlotCodec;

/// Shape of one logical record list. Both values are part of the on-disk
/// format: reopening a device with a different `data_size` or `list_id`
/// makes every existing slot fail validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordListConfig {
    pub data_size: usize,
    pub list_id: u16,
}

impl RecordListConfig {
    pub fn new(data_size: usize, list_id: u16) -> Self {
        Self { data_size, list_id }
    }

    pub fn codec(&self) -> Result<SlotCodec, RecordError> {
        SlotCodec::new(self.data_size, self.list_id)
    }
}
