use crate::error;
use crate::trace_categories;

/// Single-slot cache of the most recently used filter pattern and its compiled form.
///
/// Only the last requested pattern is retained; asking for any other pattern replaces it.
/// The cache performs no locking of its own; callers that share it across threads must
/// serialize access themselves.
#[derive(Debug, Default)]
pub struct MatchCache {
    /// Source text of the cached (or last attempted) pattern.
    pattern: String,
    /// Compiled form of `pattern`; absent until a compile of it succeeds.
    compiled: Option<regex::Regex>,
}

impl MatchCache {
    /// Returns a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes whether `candidate` contains a match for `pattern`, compiling and caching
    /// `pattern` first if it is not the currently cached one.
    ///
    /// # Arguments
    ///
    /// * `pattern` - The regular expression to match with.
    /// * `candidate` - The string to search.
    pub fn matches(&mut self, pattern: &str, candidate: &str) -> Result<bool, error::Error> {
        if !self.is_cached(pattern) {
            tracing::debug!(target: trace_categories::MATCH, pattern, "compiling filter pattern");

            // Drop the stale matcher before compiling so a failure can't leave it
            // associated with the new pattern.
            self.compiled = None;
            pattern.clone_into(&mut self.pattern);
            self.compiled = Some(compile_pattern(pattern)?);
        }

        Ok(self
            .compiled
            .as_ref()
            .is_some_and(|re| re.is_match(candidate)))
    }

    /// Returns the pattern whose compiled form is currently cached, if any.
    pub fn cached_pattern(&self) -> Option<&str> {
        self.compiled.as_ref().map(|_| self.pattern.as_str())
    }

    fn is_cached(&self, pattern: &str) -> bool {
        self.compiled.is_some() && self.pattern == pattern
    }
}

fn compile_pattern(pattern: &str) -> Result<regex::Regex, error::Error> {
    regex::Regex::new(pattern).map_err(|e| error::Error::InvalidPattern(e, pattern.to_owned()))
}
