pub mod format;
pub mod frame;
