//! Command-line front end for the testdeps bridge: filters names through the match
//! cache, records instrumented environment access into a test log, and inspects
//! recorded logs.

pub mod args;
pub mod commands;
pub mod config;
pub mod entry;
mod error;
mod error_formatter;
pub mod events;
mod productinfo;

pub use error::Error;
