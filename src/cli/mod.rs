//! Command-line host for the layer filter

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
