//! # Exception diagnostics.
//!
//! Formats an observer failure into the text handed to the log sink:
//!
//! ```text
//! error: <program>: An exception occurred.
//! Error: <message>
//! <file> <line>
//! Traceback (most recent call last):
//!   File "<file>", line <line>, in <observer>
//! ```
//!
//! The frame line is omitted when tracebacks are disabled in [`Config`](crate::Config).

use std::fmt::Write as _;
use std::panic::Location;

/// One contained observer failure.
#[derive(Debug, Clone)]
pub struct Failure<'a> {
    /// Name reported by the observer.
    pub observer: &'a str,
    /// Error message (or panic payload text).
    pub message: &'a str,
    /// Where the failure was raised, or where the observer was added for panics.
    pub location: &'static Location<'static>,
}

/// Renders `failure` as a multi-line diagnostic for `program`.
pub fn format_exception(program: &str, failure: &Failure<'_>, traceback: bool) -> String {
    let file = failure.location.file();
    let line = failure.location.line();

    let mut out = String::with_capacity(128);
    let _ = writeln!(out, "error: {program}: An exception occurred.");
    let _ = writeln!(out, "Error: {}", failure.message);
    let _ = writeln!(out, "{file} {line}");
    out.push_str("Traceback (most recent call last):");
    if traceback {
        let _ = write!(
            out,
            "\n  File \"{file}\", line {line}, in {}",
            failure.observer
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lines() {
        let location = Location::caller();
        let failure = Failure {
            observer: "badCb",
            message: "foo",
            location,
        };
        let text = format_exception("my-addon", &failure, true);
        let lines: Vec<&str> = text.split('\n').collect();

        assert_eq!(lines[0], "error: my-addon: An exception occurred.");
        assert_eq!(lines[1], "Error: foo");
        assert_eq!(lines[2], format!("{} {}", location.file(), location.line()));
        assert_eq!(lines[3], "Traceback (most recent call last):");
        assert_eq!(
            lines[4],
            format!("  File \"{}\", line {}, in badCb", location.file(), location.line())
        );
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_without_traceback_frames() {
        let failure = Failure {
            observer: "x",
            message: "bar",
            location: Location::caller(),
        };
        let text = format_exception("p", &failure, false);
        assert_eq!(text.lines().count(), 4);
        assert!(text.ends_with("Traceback (most recent call last):"));
    }
}
