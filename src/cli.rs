//! Command-line argument definitions.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI entry point for the opencode profile manager.
#[derive(Parser, Debug)]
#[command(
    name = "ocmgr",
    about = "Compose and apply reusable .opencode profiles",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Override the profile store directory
    #[arg(long, global = true, env = "OCMGR_STORE")]
    pub store: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply one or more profiles to a project's .opencode directory
    Init(InitOpts),
    /// Manage profiles in the local store
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Capture a project's .opencode directory as a new profile
    Snapshot(SnapshotOpts),
    /// Show or change configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

impl Command {
    /// Short name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Profile(_) => "profile",
            Self::Snapshot(_) => "snapshot",
            Self::Config(_) => "config",
            Self::Completions { .. } => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `init` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct InitOpts {
    /// Project directory; profiles are written to its .opencode directory
    #[arg(default_value = ".")]
    pub target: PathBuf,

    /// Profile to apply (repeatable, applied in order)
    #[arg(short, long = "profile", required = true, value_delimiter = ',')]
    pub profiles: Vec<String>,

    /// Overwrite existing files without asking
    #[arg(short, long)]
    pub force: bool,

    /// Keep existing files and only add new ones
    #[arg(short, long)]
    pub merge: bool,

    /// Preview changes without writing anything
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Only copy these content directories (comma-separated)
    #[arg(short, long)]
    pub only: Option<String>,

    /// Skip these content directories (comma-separated)
    #[arg(short, long)]
    pub exclude: Option<String>,
}

/// `profile` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    /// List profiles in the store
    List,
    /// Show a profile's metadata and contents
    Show {
        /// Profile name
        name: String,
    },
    /// Scaffold an empty profile
    Create {
        /// Profile name
        name: String,
    },
    /// Delete a profile from the store
    Delete {
        /// Profile name
        name: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Copy a profile directory (containing profile.toml) into the store
    Import {
        /// Local profile directory
        source: PathBuf,
    },
    /// Copy a profile out of the store into DIR/NAME
    Export {
        /// Profile name
        name: String,
        /// Destination directory
        dir: PathBuf,
    },
}

/// Options for the `snapshot` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SnapshotOpts {
    /// Name of the new profile
    pub name: String,

    /// Project directory containing .opencode
    #[arg(default_value = ".")]
    pub source: PathBuf,

    /// Profile description
    #[arg(long)]
    pub description: Option<String>,

    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

/// `config` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Print every configuration value
    Show,
    /// Set a configuration value
    Set {
        /// Dotted key, e.g. github.repo
        key: String,
        /// New value
        value: String,
    },
    /// Print the configuration file path
    Path,
    /// Answer a few questions and write the configuration file
    Init,
}
