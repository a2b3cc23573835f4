//! Subcommand orchestration.
pub mod config;
pub mod init;
pub mod profile;
pub mod snapshot;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{Settings, config_path};
use crate::logging::Logger;
use crate::store::Store;

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates configuration loading and opening the profile store so that
/// each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Loaded user configuration.
    pub settings: Settings,
    /// Opened profile store.
    pub store: Store,
}

impl CommandSetup {
    /// Load the configuration and open the profile store.
    ///
    /// `--store` (or `OCMGR_STORE`) takes precedence over `store.path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the store
    /// directory cannot be created.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let path = config_path()?;
        let settings = Settings::load(&path).context("loading config")?;
        let store_dir = global
            .store
            .clone()
            .unwrap_or_else(|| settings.store_path());
        log.debug(&format!("store: {}", store_dir.display()));
        let store = Store::open(&store_dir).context("opening store")?;
        Ok(Self { settings, store })
    }
}

/// Print the version string.
#[allow(clippy::print_stdout)]
pub fn version() {
    let version = option_env!("OCMGR_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    println!("ocmgr {version}");
}

/// Write the completion script for `shell` to `out`.
pub fn completions(shell: clap_complete::Shell, out: &mut dyn std::io::Write) {
    use clap::CommandFactory as _;
    let mut cmd = crate::cli::Cli::command();
    clap_complete::generate(shell, &mut cmd, "ocmgr", out);
}
