//! Command-line argument definitions.

use clap::{Parser, Subcommand, builder::styling};
use std::path::PathBuf;

use crate::{events, productinfo};

const SHORT_DESCRIPTION: &str = "Test harness dependency bridge";

const LONG_DESCRIPTION: &str = r"
testdeps drives the services a test harness reaches through its dependency bridge: filtering
test names with the cached pattern matcher, recording the environment access a test performs
into a test log, and reading recorded logs back.
";

const VERSION: &str = const_format::concatcp!(
    productinfo::PRODUCT_VERSION,
    " (",
    productinfo::PRODUCT_GIT_VERSION,
    ")"
);

/// Parsed command-line arguments for `testdeps`.
#[derive(Parser)]
#[clap(name = productinfo::PRODUCT_NAME,
       version = VERSION,
       about = SHORT_DESCRIPTION,
       long_about = LONG_DESCRIPTION,
       styles = help_styles())]
#[allow(clippy::module_name_repetitions)]
pub struct CommandLineArgs {
    /// Path to the configuration file to load.
    #[clap(long = "config", env = "TESTDEPS_CONFIG", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    /// Do not load any configuration file.
    #[clap(long = "no-config", global = true)]
    pub no_config: bool,

    /// Enable debug logging for classes of tracing events.
    #[clap(long = "log-enable", value_name = "EVENT", global = true)]
    pub enabled_log_events: Vec<events::TraceEvent>,

    /// Operation to perform.
    #[clap(subcommand)]
    pub command: Command,
}

/// Operations supported by `testdeps`.
#[derive(Subcommand)]
pub enum Command {
    /// Print the names that match a filter pattern.
    Match(MatchArgs),
    /// Perform instrumented environment operations while recording a test log.
    Record(RecordArgs),
    /// Print the actions recorded in a test log.
    Inspect(InspectArgs),
}

/// Arguments for `testdeps match`.
#[derive(clap::Args)]
pub struct MatchArgs {
    /// Filter pattern (regular expression, unanchored).
    pub pattern: String,

    /// Candidate names.
    pub names: Vec<String>,

    /// Collect a CPU profile while matching and write it to this file.
    #[clap(long = "cpu-profile", value_name = "FILE")]
    pub cpu_profile: Option<PathBuf>,

    /// CPU profile sampling frequency, in Hz.
    #[clap(long = "frequency", value_name = "HZ", value_parser = clap::value_parser!(i32).range(1..))]
    pub frequency: Option<i32>,
}

/// Arguments for `testdeps record`.
#[derive(clap::Args)]
pub struct RecordArgs {
    /// File to write the test log to.
    #[clap(long = "output", short = 'o', value_name = "FILE")]
    pub output: PathBuf,

    /// Read an environment variable.
    #[clap(long = "getenv", value_name = "KEY")]
    pub getenv: Vec<String>,

    /// Query a file's metadata.
    #[clap(long = "stat", value_name = "PATH")]
    pub stat: Vec<PathBuf>,

    /// Open a file for reading.
    #[clap(long = "open", value_name = "PATH")]
    pub open: Vec<PathBuf>,

    /// Change the working directory.
    #[clap(long = "chdir", value_name = "PATH")]
    pub chdir: Vec<PathBuf>,
}

/// Arguments for `testdeps inspect`.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Test log to read.
    pub file: PathBuf,

    /// Print per-operation counts instead of individual actions.
    #[clap(long = "summary")]
    pub summary: bool,
}

/// Returns clap styling to be used for command-line help.
#[doc(hidden)]
fn help_styles() -> clap::builder::Styles {
    styling::Styles::styled()
        .header(
            styling::AnsiColor::Yellow.on_default()
                | styling::Effects::BOLD
                | styling::Effects::UNDERLINE,
        )
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Magenta.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default())
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_match() -> Result<()> {
        let args = CommandLineArgs::try_parse_from([
            "testdeps",
            "match",
            "^TestFoo",
            "TestFooBar",
            "TestBaz",
            "--cpu-profile",
            "cpu.svg",
        ])?;

        let Command::Match(match_args) = args.command else {
            anyhow::bail!("expected match command");
        };
        assert_eq!(match_args.pattern, "^TestFoo");
        assert_eq!(match_args.names, vec!["TestFooBar", "TestBaz"]);
        assert_eq!(match_args.cpu_profile, Some(PathBuf::from("cpu.svg")));
        assert_eq!(match_args.frequency, None);
        Ok(())
    }

    #[test]
    fn parse_record_with_global_flags() -> Result<()> {
        let args = CommandLineArgs::try_parse_from([
            "testdeps",
            "record",
            "-o",
            "log.txt",
            "--getenv",
            "HOME",
            "--getenv",
            "PATH",
            "--chdir",
            "/tmp",
            "--no-config",
            "--log-enable",
            "testlog",
        ])?;

        assert!(args.no_config);
        assert_eq!(args.enabled_log_events, vec![events::TraceEvent::TestLog]);
        let Command::Record(record_args) = args.command else {
            anyhow::bail!("expected record command");
        };
        assert_eq!(record_args.output, PathBuf::from("log.txt"));
        assert_eq!(record_args.getenv, vec!["HOME", "PATH"]);
        assert_eq!(record_args.chdir, vec![PathBuf::from("/tmp")]);
        assert!(record_args.stat.is_empty());
        Ok(())
    }

    #[test]
    fn zero_frequency_is_rejected() {
        let result =
            CommandLineArgs::try_parse_from(["testdeps", "match", "x", "--frequency", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(CommandLineArgs::try_parse_from(["testdeps"]).is_err());
    }
}
