//! Rendering of errors for display on stderr.

use crate::error::Error;

#[derive(Debug, Default, Clone)]
pub(crate) struct Formatter {
    pub use_color: bool,
}

impl Formatter {
    pub fn format_error(&self, err: &Error) -> String {
        let prefix = if self.use_color {
            color_print::cstr!("<red>error:</red> ")
        } else {
            "error: "
        };

        std::format!("{prefix}{err:#}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_prefix_without_color() {
        let formatter = Formatter::default();
        let err = Error::Core(testdeps_core::Error::MissingLogHeader);

        assert_eq!(
            formatter.format_error(&err),
            "error: missing test log header\n"
        );
    }

    #[test]
    fn colored_prefix_wraps_label() {
        let formatter = Formatter { use_color: true };
        let err = Error::Core(testdeps_core::Error::MissingLogHeader);

        let text = formatter.format_error(&err);
        assert!(text.starts_with('\u{1b}'));
        assert!(text.ends_with("missing test log header\n"));
    }
}
