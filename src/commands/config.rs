//! Command: show and change configuration.
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::ConfigCommand;
use crate::config::{Settings, config_path};
use crate::logging::Logger;

/// Run a `config` subcommand against the default configuration file.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be located, read or
/// written, or a key/value is rejected.
pub fn run(command: &ConfigCommand, log: &Logger) -> Result<()> {
    let path = config_path()?;
    let output = execute(command, &path, log)?;
    emit(&output);
    Ok(())
}

/// Execute `command` against the configuration file at `path` and return
/// the text to print.
///
/// # Errors
///
/// See [`run`].
pub fn execute(command: &ConfigCommand, path: &Path, log: &Logger) -> Result<String> {
    match command {
        ConfigCommand::Show => {
            let settings = Settings::load(path).context("loading config")?;
            Ok(format!(
                "Configuration ({}):\n\n{}",
                path.display(),
                settings.render()
            ))
        }
        ConfigCommand::Set { key, value } => {
            let mut settings = Settings::load(path).context("loading config")?;
            settings.set(key, value)?;
            settings.save(path).context("saving config")?;
            log.debug(&format!("wrote {}", path.display()));
            Ok(format!("Set {key} = {value}\n"))
        }
        ConfigCommand::Path => Ok(format!("{}\n", path.display())),
        ConfigCommand::Init => init(path, &mut io::stdin().lock(), &mut io::stderr(), log),
    }
}

/// Keys asked for by `config init`, with their prompt labels.
const INIT_PROMPTS: &[(&str, &str)] = &[
    ("github.repo", "GitHub repository (owner/repo)"),
    ("github.auth", "Auth method (gh/env/ssh/token)"),
    (
        "defaults.merge_strategy",
        "Default merge strategy (prompt/overwrite/merge/skip)",
    ),
    ("defaults.editor", "Editor"),
];

/// Ask for the main settings on `output`, reading answers from `input`,
/// and write the result to `path`.
///
/// Each prompt shows the current value; an empty answer (or end of input)
/// keeps it. Answers are validated like `config set`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written, input cannot be
/// read, or an answer is rejected. Nothing is written in that case.
pub fn init(
    path: &Path,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    log: &Logger,
) -> Result<String> {
    let mut settings = Settings::load(path).context("loading config")?;
    for (key, label) in INIT_PROMPTS {
        let current = settings.get(key).unwrap_or_default().to_string();
        write!(output, "{label} [{current}]: ")?;
        output.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer).context("reading answer")?;
        let answer = answer.trim();
        if !answer.is_empty() {
            settings.set(key, answer)?;
        }
    }
    settings.save(path).context("saving config")?;
    log.debug(&format!("wrote {}", path.display()));
    Ok(format!("Configuration saved to {}\n", path.display()))
}

#[allow(clippy::print_stdout)]
fn emit(text: &str) {
    print!("{text}");
}
