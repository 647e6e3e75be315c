mod allocator;
pub mod free_cache;
pub mod record;
pub mod record_list;

pub use allocator::PREPEND_THRESHOLD;
