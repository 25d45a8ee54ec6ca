//! Command line interface support

pub mod commands;

pub use commands::{Command, run_command};
