pub mod chain;
pub mod cursor;
pub mod hooks;
