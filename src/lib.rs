//! Profile manager for project-local `.opencode` directories.
//!
//! Profiles are named bundles of agents, commands, skills and plugins kept
//! in a local store. A profile may extend one parent; applying it copies the
//! whole ancestor chain, root first, into a project's `.opencode` directory
//! under an overwrite, merge or prompt conflict policy.
//!
//! The public API is organised into four layers:
//!
//! - **[`profiles`]**: chain resolution, content filters, conflict policy and
//!   materialization (no console output)
//! - **[`store`]**: the on-disk profile store and `profile.toml` metadata
//! - **[`config`]**: `config.toml` loading and key updates
//! - **[`commands`]**: top-level subcommand orchestration (`init`, `profile`,
//!   `snapshot`, `config`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod profiles;
pub mod store;
