//! Grantex CLI library.
//!
//! This library provides the pieces behind the `grantex` binary: argument
//! parsing, layered configuration, logging setup and the command
//! implementations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command};
pub use config::AppConfig;
pub use error::{CliError, Result};
