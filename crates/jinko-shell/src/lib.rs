//! Jinko Shell - agent console for the Jinko Vault workflow
//!
//! - [`config`]: layered configuration (defaults, TOML file, environment)
//! - [`command`]: the line command language
//! - [`console`]: drives a [`jinko_core::WorkflowController`] from commands

#![warn(unreachable_pub)]

pub mod command;
pub mod config;
pub mod console;

pub use command::{Command, CommandError};
pub use config::{ConfigError, ShellConfig};
pub use console::{Console, Flow};
