//! # Registry configuration.
//!
//! Provides [`Config`], the settings shared by every registry a
//! [`Loader`](crate::Loader) hands out.
//!
//! ## Sentinel values
//! - `program = ""` → falls back to the crate name in diagnostics

use std::borrow::Cow;

/// Settings for registries and their failure diagnostics.
///
/// ## Field semantics
/// - `program`: identity printed in the first diagnostic line
/// - `traceback`: append the `File "...", line N, in <observer>` frame line
#[derive(Clone, Debug)]
pub struct Config {
    /// Program identity used in `error: <program>: An exception occurred.`
    pub program: Cow<'static, str>,

    /// Whether diagnostics carry the frame line under the traceback header.
    pub traceback: bool,
}

impl Config {
    /// Returns a config with the given program identity and default settings.
    pub fn for_program(program: impl Into<Cow<'static, str>>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Returns the program identity, falling back to the crate name when empty.
    #[inline]
    pub fn program_name(&self) -> &str {
        if self.program.is_empty() {
            env!("CARGO_PKG_NAME")
        } else {
            &self.program
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `program = "observer-service"`
    /// - `traceback = true`
    fn default() -> Self {
        Self {
            program: Cow::Borrowed(env!("CARGO_PKG_NAME")),
            traceback: true,
        }
    }
}
