//! Subcommand implementations.

pub mod add;
pub mod mv;
pub mod rm;
pub mod show;
