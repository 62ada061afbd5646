use alloc::string::{String, ToString};
use core::fmt;

use thiserror::Error;

use crate::{
    location::Location,
    parser::{StreamError, StreamParser},
    source::ByteSource,
};

const UNSPECIFIED: &str = "Unspecified error.";

/// A grammar-level error, rendered as `ERROR <name>:<line>:<col>: <message>`.
///
/// Without a location the prefix is just `ERROR:`, and without a message the
/// text reads `Unspecified error.`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ERROR{}: {}", LocationPrefix(.location.as_ref()), .message.as_deref().unwrap_or(UNSPECIFIED))]
pub struct Diagnostic {
    /// Where the error was detected.
    pub location: Option<Location>,
    /// What went wrong.
    pub message: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with an optional location.
    pub fn new(location: Option<Location>, message: impl Into<String>) -> Self {
        Self {
            location,
            message: Some(message.into()),
        }
    }

    /// Creates a diagnostic at the parser's current position.
    pub fn at<S: ByteSource>(parser: &StreamParser<S>, message: impl Into<String>) -> Self {
        Self::new(Some(parser.location()), message)
    }

    /// Creates a diagnostic without a message.
    #[must_use]
    pub fn unspecified(location: Option<Location>) -> Self {
        Self {
            location,
            message: None,
        }
    }
}

/// Lets grammar code use `?` on parser operations. The diagnostic carries no
/// location; use [`Diagnostic::at`] when the position matters.
impl From<StreamError> for Diagnostic {
    fn from(err: StreamError) -> Self {
        Self::new(None, err.to_string())
    }
}

struct LocationPrefix<'a>(Option<&'a Location>);

impl fmt::Display for LocationPrefix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(location) => write!(f, " {location}"),
            None => Ok(()),
        }
    }
}
