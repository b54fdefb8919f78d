//! CLI, configuration and commands for the `photomirror` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod interrupt;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use interrupt::Interrupt;
