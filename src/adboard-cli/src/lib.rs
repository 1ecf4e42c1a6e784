//! adboard CLI library.
//!
//! - `cli` - argument parsing and command handlers
//! - `config` - configuration file and environment resolution
//! - `render` - text tables for campaigns, users and session state
//! - `styled_output` - status messages on stderr

pub mod cli;
pub mod config;
pub mod render;
pub mod styled_output;
