//! Subcommand implementations

pub mod apps;
pub mod collect;
