//! Fuzzes the filter pattern cache with arbitrary patterns and names.

#![no_main]

use std::sync::{LazyLock, Mutex, PoisonError};

use libfuzzer_sys::fuzz_target;
use testdeps_core::MatchCache;

// Shared across inputs so that replacement of the cached pattern gets exercised.
static CACHE: LazyLock<Mutex<MatchCache>> = LazyLock::new(|| Mutex::new(MatchCache::new()));

fuzz_target!(|input: (String, String)| {
    let (pattern, name) = input;

    let cached = CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .matches(&pattern, &name);
    let fresh = MatchCache::new().matches(&pattern, &name);

    // A reused compiled pattern must answer exactly like a freshly compiled one.
    assert_eq!(
        cached.ok(),
        fresh.ok(),
        "cached and fresh results differ (pattern: {pattern:?}, name: {name:?})"
    );
});
