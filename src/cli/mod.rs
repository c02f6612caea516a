//! Command-line interface
//!
//! Argument parsing and the runner wiring config, state, client, and engine
//! together.

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
