//! `ocmgr` binary entry point.
use anyhow::Result;
use clap::Parser;

use ocmgr_cli::cli::{self, Command};
use ocmgr_cli::commands;
use ocmgr_cli::error::ProfileError;
use ocmgr_cli::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let command = args.command.name();
    logging::init_subscriber(args.verbose, command);
    let log = Logger::new(command);

    let result = match &args.command {
        Command::Init(opts) => commands::init::run(&args.global, opts, &log),
        Command::Profile(sub) => commands::profile::run(&args.global, sub, &log),
        Command::Snapshot(opts) => commands::snapshot::run(&args.global, opts, &log),
        Command::Config(sub) => commands::config::run(sub, &log),
        Command::Completions { shell } => {
            commands::completions(*shell, &mut std::io::stdout());
            Ok(())
        }
        Command::Version => {
            commands::version();
            Ok(())
        }
    };

    match result {
        Err(e)
            if e.downcast_ref::<ProfileError>()
                .is_some_and(ProfileError::is_cancelled) =>
        {
            log.warn("Aborted.");
            Ok(())
        }
        other => other,
    }
}
