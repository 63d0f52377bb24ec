//! Implementations of the `testdeps` subcommands.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use testdeps_core::testlog::{self, LogSummary};
use testdeps_core::{Bridge, TestDeps, instrumented, profile, trace_categories};

use crate::args::{InspectArgs, MatchArgs, RecordArgs};
use crate::config::Config;
use crate::error::Error;

/// Writes each name that matches the pattern to `out`, one per line.
///
/// # Arguments
///
/// * `args` - Parsed `match` arguments.
/// * `config` - Loaded configuration.
/// * `out` - Destination for matching names.
pub fn run_match(args: &MatchArgs, config: &Config, out: &mut impl Write) -> Result<(), Error> {
    let frequency = config.profile_frequency(args.frequency);
    let bridge = Bridge::builder()
        .profiler(profile::default_profiler(frequency))
        .build();

    // Compile up front so a bad pattern is reported even without names.
    bridge.match_string(&args.pattern, "")?;

    if let Some(path) = &args.cpu_profile {
        let sink = create_file(path)?;
        bridge.start_cpu_profile(Box::new(sink))?;
    }

    let result = write_matches(&bridge, args, out);

    if args.cpu_profile.is_some() {
        bridge.stop_cpu_profile();
    }

    result
}

fn write_matches(bridge: &Bridge, args: &MatchArgs, out: &mut impl Write) -> Result<(), Error> {
    for name in &args.names {
        if bridge.match_string(&args.pattern, name)? {
            writeln!(out, "{name}")?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Records a test log while performing the requested instrumented operations.
///
/// Operations run in a fixed order: environment reads, metadata queries, opens, then
/// directory changes. A failing operation is logged and does not stop the recording.
///
/// # Arguments
///
/// * `args` - Parsed `record` arguments.
pub fn run_record(args: &RecordArgs) -> Result<(), Error> {
    let bridge = Bridge::default();
    let sink = create_file(&args.output)?;
    bridge.start_test_log(Box::new(sink))?;

    for key in &args.getenv {
        let found = instrumented::var(key).is_some();
        tracing::debug!(target: trace_categories::TESTLOG, key, found, "read environment variable");
    }

    for path in &args.stat {
        if let Err(err) = instrumented::metadata(path) {
            tracing::debug!(target: trace_categories::TESTLOG, "stat {}: {err}", path.display());
        }
    }

    for path in &args.open {
        if let Err(err) = instrumented::open(path) {
            tracing::debug!(target: trace_categories::TESTLOG, "open {}: {err}", path.display());
        }
    }

    for path in &args.chdir {
        if let Err(err) = instrumented::set_current_dir(path) {
            tracing::debug!(target: trace_categories::TESTLOG, "chdir {}: {err}", path.display());
        }
    }

    bridge.stop_test_log()?;
    Ok(())
}

/// Writes the contents of a recorded test log to `out`.
///
/// # Arguments
///
/// * `args` - Parsed `inspect` arguments.
/// * `config` - Loaded configuration.
/// * `out` - Destination for the listing.
pub fn run_inspect(args: &InspectArgs, config: &Config, out: &mut impl Write) -> Result<(), Error> {
    let file = File::open(&args.file).map_err(|source| Error::File {
        path: args.file.clone(),
        source,
    })?;
    let actions = testlog::parse(BufReader::new(file))?;

    if config.inspect_summary(args.summary) {
        for (action, count) in LogSummary::new(&actions).counts() {
            writeln!(out, "{action} {count}")?;
        }
    } else {
        for entry in &actions {
            writeln!(out, "{} {}", entry.action, entry.name)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn create_file(path: &Path) -> Result<File, Error> {
    File::create(path).map_err(|source| Error::File {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use anyhow::Result;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    fn match_args(pattern: &str, names: &[&str]) -> MatchArgs {
        MatchArgs {
            pattern: pattern.to_owned(),
            names: names.iter().map(|name| (*name).to_owned()).collect(),
            cpu_profile: None,
            frequency: None,
        }
    }

    #[test]
    fn match_prints_matching_names() -> Result<()> {
        let mut out = vec![];
        run_match(
            &match_args("^TestFoo", &["TestFooBar", "TestBaz", "TestFoo"]),
            &Config::default(),
            &mut out,
        )?;

        assert_eq!(String::from_utf8(out)?, "TestFooBar\nTestFoo\n");
        Ok(())
    }

    #[test]
    fn match_rejects_invalid_pattern_without_names() {
        let mut out = vec![];
        let result = run_match(&match_args("((", &[]), &Config::default(), &mut out);

        assert!(matches!(
            result,
            Err(Error::Core(testdeps_core::Error::InvalidPattern(..)))
        ));
    }

    #[test]
    fn inspect_lists_actions() -> Result<()> {
        let dir = assert_fs::TempDir::new()?;
        let log = dir.child("log.txt");
        log.write_str("# test log\ngetenv HOME\nopen /etc/hosts\ngetenv HOME\n")?;

        let mut out = vec![];
        let args = InspectArgs {
            file: log.path().to_path_buf(),
            summary: false,
        };
        run_inspect(&args, &Config::default(), &mut out)?;

        assert_eq!(
            String::from_utf8(out)?,
            "getenv HOME\nopen /etc/hosts\ngetenv HOME\n"
        );
        Ok(())
    }

    #[test]
    fn inspect_summarizes_from_config() -> Result<()> {
        let dir = assert_fs::TempDir::new()?;
        let log = dir.child("log.txt");
        log.write_str("# test log\nchdir /a\ngetenv HOME\nopen /x\ngetenv PATH\n")?;

        let config: Config = toml::from_str("[inspect]\nsummary = true\n")?;
        let mut out = vec![];
        let args = InspectArgs {
            file: log.path().to_path_buf(),
            summary: false,
        };
        run_inspect(&args, &config, &mut out)?;

        assert_eq!(String::from_utf8(out)?, "getenv 2\nopen 1\nchdir 1\n");
        Ok(())
    }

    #[test]
    fn inspect_reports_missing_file() {
        let args = InspectArgs {
            file: "/nonexistent/log.txt".into(),
            summary: false,
        };

        let result = run_inspect(&args, &Config::default(), &mut vec![]);
        assert!(matches!(result, Err(Error::File { .. })));
    }
}
