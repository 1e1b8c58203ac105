//! # PlainTextConsole — print-function sink
//!
//! Passes each diagnostic verbatim to a user supplied print function. Tests use it
//! to capture output; [`PlainTextConsole::stderr`] writes to standard error.

use std::fmt;

use super::sink::LogSink;

/// Sink that forwards each diagnostic to a print function.
pub struct PlainTextConsole {
    print: Box<dyn Fn(&str) + Send + Sync>,
}

impl PlainTextConsole {
    /// Creates a console that calls `print` once per diagnostic.
    pub fn new(print: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            print: Box::new(print),
        }
    }

    /// Console writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(|text| eprintln!("{text}"))
    }
}

impl LogSink for PlainTextConsole {
    fn write(&self, text: &str) {
        (self.print)(text)
    }
}

impl fmt::Debug for PlainTextConsole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainTextConsole")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_forwards_text_verbatim() {
        let prints = Arc::new(Mutex::new(Vec::<String>::new()));
        let p = Arc::clone(&prints);
        let console = PlainTextConsole::new(move |text| p.lock().unwrap().push(text.to_owned()));

        console.write("line one\nline two");
        assert_eq!(*prints.lock().unwrap(), vec!["line one\nline two".to_string()]);
    }
}
