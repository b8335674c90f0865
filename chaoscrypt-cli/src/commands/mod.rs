//! Subcommand implementations.

pub mod algorithms;
pub mod analyze;
pub mod decrypt;
pub mod encrypt;
