//! CLI commands.

pub mod explain;
pub mod info;
