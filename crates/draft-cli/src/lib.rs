//! Library side of the `contract-drafter` command.

pub mod config;
pub mod logging;
pub mod pipeline;
