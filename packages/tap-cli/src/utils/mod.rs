pub mod defaults;
pub mod log;
