//! CLI module for flock - command-line interface and subcommands.
//!
//! Read-only views over the seeded directory plus JSON/CSV exports.

pub mod commands;

pub use commands::Cli;
