pub mod backing_store;
pub mod faulty;
pub mod file_device;
pub mod mem_device;
