//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod init;
pub mod probe;
pub mod targets;
pub mod watch;
