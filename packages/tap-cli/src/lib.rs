pub mod cli;
pub(crate) mod commands;
pub(crate) mod ops;
pub(crate) mod utils;
