//! Command-line interface for shorthand
//!
//! The `run` function parses command-line arguments with clap and routes to one of four
//! commands:
//!
//! - **parse**: Parse one directive and print its decoded fields
//! - **resolve**: Resolve one directive against a type universe and print the metric name
//!   of every selected member
//! - **init**: Generate a default configuration file
//! - **validate**: Check a configuration file
//!
//! All output goes through a [`Host`] so the commands can run against in-memory buffers.

mod common;
mod host;
mod init;
mod parse;
mod resolve;
mod run;
mod validate;

pub use common::{GlobalArgs, LogLevel};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use parse::{ParseArgs, parse_directive};
pub use resolve::{ResolveArgs, resolve_directive};
pub use run::run;
pub use validate::validate_config;

#[cfg(test)]
pub(crate) use host::TestHost;
