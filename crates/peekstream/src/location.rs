//! Stream positions and the helpers that turn them into diagnostics.

use alloc::{
    format,
    string::{String, ToString},
    sync::Arc,
};
use core::fmt;

use crate::utf8::{self, CodePoint};

/// A snapshot of a position in a named stream.
///
/// `line` and `column` are 1-based and describe the next unread character.
/// The name is shared with the parser that produced the snapshot but is
/// immutable, so the snapshot stays valid after the parser is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Location {
    /// The name of the source, typically a file name.
    pub name: Arc<str>,
    /// The 1-based line number.
    pub line: u32,
    /// The 1-based column number, counted in characters.
    pub column: u32,
}

impl Location {
    /// Creates a location.
    pub fn new(name: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            name: name.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.line, self.column)
    }
}

/// Formats `location` as `<name>:<line>:<column>`, or `""` for `None`.
#[must_use]
pub fn format_location(location: Option<&Location>) -> String {
    location.map(ToString::to_string).unwrap_or_default()
}

/// Formats a code point for a diagnostic as `U+XXXX (c)`.
///
/// The hex value has at least four digits. ISO control characters, and values
/// that are not Unicode scalar values (surrogates, sentinels), show `?` in
/// place of the glyph.
#[must_use]
pub fn format_character(code_point: CodePoint) -> String {
    let glyph = match char::from_u32(code_point) {
        Some(ch) if !utf8::is_iso_control(code_point) => ch,
        _ => '?',
    };
    format!("U+{code_point:04X} ({glyph})")
}
