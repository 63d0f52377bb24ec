//! Fuzzes the test log with arbitrary actions and checks the bytes that reach the sink.

#![no_main]

use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use libfuzzer_sys::fuzz_target;
use testdeps_core::testlog::HEADER;
use testdeps_core::{Action, Registry, TestLog};

static REGISTRY: Registry = Registry::new();
static LOG: TestLog = TestLog::new();

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn action_for(selector: u8) -> Action {
    match selector % 4 {
        0 => Action::Getenv,
        1 => Action::Open,
        2 => Action::Stat,
        _ => Action::Chdir,
    }
}

fuzz_target!(|input: Vec<(u8, String)>| {
    let capture = Capture::default();
    let first_run = !LOG.is_armed();
    LOG.start(Box::new(capture.clone()), &REGISTRY).unwrap();

    let mut expected = if first_run {
        HEADER.to_owned()
    } else {
        String::new()
    };

    for (selector, name) in &input {
        let action = action_for(*selector);
        match action {
            Action::Getenv => REGISTRY.getenv(name),
            Action::Open => REGISTRY.open(name),
            Action::Stat => REGISTRY.stat(name),
            Action::Chdir => REGISTRY.chdir(name),
        }

        if !name.is_empty() && !name.contains('\n') && !name.ends_with('\r') {
            writeln!(expected, "{action} {name}").unwrap();
        }
    }

    LOG.stop().unwrap();

    let written = capture.0.lock().unwrap_or_else(PoisonError::into_inner);
    assert_eq!(String::from_utf8_lossy(&written), expected);
});
