#![deny(unused_crate_dependencies)]

pub mod api;
pub mod cli;
pub(crate) mod commands;
pub mod models;
pub mod upstream;
mod uses;
