//! Entry point for the `testdeps` binary.

fn main() {
    testdeps_cli::entry::run();
}
