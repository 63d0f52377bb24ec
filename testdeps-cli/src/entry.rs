//! Process entry point for the `testdeps` tool.

use clap::Parser;
use std::io::IsTerminal;

use crate::args::{Command, CommandLineArgs};
use crate::commands;
use crate::config;
use crate::error::Error;
use crate::error_formatter;
use crate::events;
use crate::productinfo;

/// Main entry point for `testdeps`.
pub fn run() {
    install_panic_handler();

    let args = match CommandLineArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();

            // clap reports `--help` and `--version` as errors too.
            let exit_code = match e.kind() {
                clap::error::ErrorKind::DisplayVersion => 0,
                clap::error::ErrorKind::DisplayHelp => 0,
                _ => 1,
            };

            std::process::exit(exit_code);
        }
    };

    let exit_code = match run_with_args(&args) {
        Ok(()) => 0,
        Err(err) => {
            let formatter = error_formatter::Formatter {
                use_color: std::io::stderr().is_terminal(),
            };
            eprint!("{}", formatter.format_error(&err));
            1
        }
    };

    std::process::exit(exit_code);
}

/// Installs a panic handler that, on release builds, captures panic details to a
/// temporary file and reports a human-readable message.
fn install_panic_handler() {
    human_panic::setup_panic!(human_panic::Metadata::new(
        productinfo::PRODUCT_NAME,
        productinfo::PRODUCT_VERSION
    ));
}

/// Runs the selected subcommand.
///
/// # Arguments
///
/// * `args` - The parsed command-line arguments.
pub fn run_with_args(args: &CommandLineArgs) -> Result<(), Error> {
    events::TraceEventConfig::init(&args.enabled_log_events);

    let loaded = config::load_config(args.no_config, args.config_file.as_deref());
    if let Some(error) = loaded.error {
        match loaded.path {
            Some(path) if loaded.explicit_path => return Err(Error::Config { path, source: error }),
            Some(path) => tracing::warn!("ignoring {}: {error}", path.display()),
            None => tracing::warn!("ignoring configuration: {error}"),
        }
    } else if let Some(path) = &loaded.path {
        tracing::debug!("configuration path: {}", path.display());
    }

    let config = loaded.config;
    let mut stdout = std::io::stdout().lock();

    match &args.command {
        Command::Match(match_args) => commands::run_match(match_args, &config, &mut stdout),
        Command::Record(record_args) => commands::run_record(record_args),
        Command::Inspect(inspect_args) => {
            commands::run_inspect(inspect_args, &config, &mut stdout)
        }
    }
}
