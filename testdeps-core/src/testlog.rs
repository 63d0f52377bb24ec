//! The test log: a line-oriented record of the environment-touching operations a test
//! binary performs, used by tooling to decide which inputs a test run depended on.
//!
//! The log starts with [`HEADER`] and then holds one `<op> <name>` line per recorded
//! action, where `<op>` is one of the [`Action`] names.

use std::io::{BufRead, BufWriter, Write};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error;
use crate::registry::{ActionLogger, Registry};
use crate::trace_categories;

/// First line of every test log.
pub const HEADER: &str = "# test log\n";

/// Kind of environment-touching operation recorded in the test log.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    strum_macros::AsRefStr,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    /// An environment variable was read.
    Getenv,
    /// A file was opened.
    Open,
    /// A file's metadata was inspected.
    Stat,
    /// The working directory was changed.
    Chdir,
}

struct LogState {
    writer: Option<BufWriter<Box<dyn Write + Send>>>,
    armed: bool,
}

/// Mutex-guarded recorder that writes actions to a caller-provided sink.
///
/// Recording is inert until [`TestLog::start`] installs a sink, and becomes inert again
/// after [`TestLog::stop`]. The first start registers the log with a [`Registry`] and
/// writes the header; later starts only rebind the sink.
pub struct TestLog {
    state: Mutex<LogState>,
}

static TEST_LOG: TestLog = TestLog::new();

/// Returns the test log shared by the whole process.
pub fn global() -> &'static TestLog {
    &TEST_LOG
}

impl Default for TestLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLog {
    /// Returns a new, unarmed log with no sink.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(LogState {
                writer: None,
                armed: false,
            }),
        }
    }

    /// Starts logging to `sink`, replacing any sink installed by an earlier start.
    ///
    /// On the first successful start, the log registers itself with `registry` and
    /// writes the header line. A harness that runs its tests several times in one
    /// process calls this once per run; later calls only install the new sink.
    ///
    /// # Arguments
    ///
    /// * `sink` - Destination for log lines; writes to it are buffered.
    /// * `registry` - Registry that instrumented code reports actions through.
    #[allow(
        clippy::significant_drop_tightening,
        reason = "arming, registration and the header write happen under one lock"
    )]
    pub fn start(
        &'static self,
        sink: Box<dyn Write + Send>,
        registry: &Registry,
    ) -> Result<(), error::Error> {
        let mut state = self.lock();

        if let Some(mut previous) = state.writer.take() {
            if let Err(err) = previous.flush() {
                tracing::warn!(target: trace_categories::TESTLOG, "failed to flush replaced test log: {err}");
            }
        }

        let mut writer = BufWriter::new(sink);

        if !state.armed {
            registry.set_logger(self)?;
            state.armed = true;

            tracing::debug!(target: trace_categories::TESTLOG, "test log armed");
            writer.write_all(HEADER.as_bytes())?;
        }

        state.writer = Some(writer);

        Ok(())
    }

    /// Flushes and detaches the current sink. Actions recorded before the next start are
    /// dropped. The sink is detached even if flushing it fails.
    pub fn stop(&self) -> Result<(), error::Error> {
        let Some(mut writer) = self.lock().writer.take() else {
            return Ok(());
        };

        match writer.flush() {
            Ok(()) => Ok(()),
            Err(err) => {
                // Discard what's left in the buffer rather than retrying on drop.
                let _ = writer.into_parts();
                Err(error::Error::LogFlush(err))
            }
        }
    }

    /// Returns whether the log has been started at least once.
    pub fn is_armed(&self) -> bool {
        self.lock().armed
    }

    /// Returns whether a sink is currently installed.
    pub fn is_active(&self) -> bool {
        self.lock().writer.is_some()
    }

    /// Appends an action line, unless no sink is installed or `name` can't be
    /// represented on a single line.
    ///
    /// # Arguments
    ///
    /// * `action` - The kind of operation performed.
    /// * `name` - The variable or path the operation touched.
    #[allow(
        clippy::significant_drop_tightening,
        reason = "each line is written under the lock so concurrent lines don't interleave"
    )]
    pub fn record(&self, action: Action, name: &str) {
        if !is_loggable(name) {
            tracing::trace!(target: trace_categories::TESTLOG, %action, "dropping unloggable name");
            return;
        }

        let mut state = self.lock();
        let Some(writer) = state.writer.as_mut() else {
            return;
        };

        if let Err(err) = writeln!(writer, "{action} {name}") {
            tracing::debug!(target: trace_categories::TESTLOG, "failed to write test log entry: {err}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Names must be non-empty and must survive being written and read back as one line.
fn is_loggable(name: &str) -> bool {
    !name.is_empty() && !name.contains('\n') && !name.ends_with('\r')
}

impl ActionLogger for TestLog {
    fn getenv(&self, key: &str) {
        self.record(Action::Getenv, key);
    }

    fn open(&self, name: &str) {
        self.record(Action::Open, name);
    }

    fn stat(&self, name: &str) {
        self.record(Action::Stat, name);
    }

    fn chdir(&self, name: &str) {
        self.record(Action::Chdir, name);
    }
}

/// One action read back from a test log.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoggedAction {
    /// The kind of operation.
    pub action: Action,
    /// The variable or path it touched.
    pub name: String,
}

/// Reads a complete test log.
///
/// The first line must be the header. Blank lines are skipped; every other line must
/// be a known operation, a single space, and a name.
///
/// # Arguments
///
/// * `reader` - Source of the log text.
pub fn parse(reader: impl BufRead) -> Result<Vec<LoggedAction>, error::Error> {
    let mut lines = reader.lines();

    let header = lines.next().transpose()?;
    if header.as_deref() != Some(HEADER.trim_end()) {
        return Err(error::Error::MissingLogHeader);
    }

    let mut actions = vec![];
    for (index, line) in lines.enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }

        // Header occupies line 1.
        let line_number = index + 2;
        let malformed = || error::Error::MalformedLogLine {
            line_number,
            line: line.clone(),
        };

        let (op, name) = line.split_once(' ').ok_or_else(malformed)?;
        let action = Action::from_str(op).map_err(|_| malformed())?;

        actions.push(LoggedAction {
            action,
            name: name.to_owned(),
        });
    }

    Ok(actions)
}

/// Per-operation view of a parsed test log.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LogSummary {
    counts: std::collections::BTreeMap<Action, usize>,
    names: std::collections::BTreeMap<Action, std::collections::BTreeSet<String>>,
}

impl LogSummary {
    /// Builds a summary of the given actions.
    pub fn new<'a>(actions: impl IntoIterator<Item = &'a LoggedAction>) -> Self {
        let mut summary = Self::default();
        for entry in actions {
            *summary.counts.entry(entry.action).or_default() += 1;
            summary
                .names
                .entry(entry.action)
                .or_default()
                .insert(entry.name.clone());
        }
        summary
    }

    /// Returns how many times `action` was recorded.
    pub fn count(&self, action: Action) -> usize {
        self.counts.get(&action).copied().unwrap_or_default()
    }

    /// Returns each recorded operation with its count, in operation order.
    pub fn counts(&self) -> impl Iterator<Item = (Action, usize)> {
        self.counts.iter().map(|(action, count)| (*action, *count))
    }

    /// Returns the distinct names recorded for `action`, in sorted order.
    pub fn names(&self, action: Action) -> impl Iterator<Item = &str> {
        self.names
            .get(&action)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }
}
