/// The default block size, which is also the lookahead limit.
pub const DEFAULT_LOOKAHEAD: usize = 4096;

/// The smallest lookahead the parser accepts; anything lower is raised to it
/// so that a full UTF-8 sequence always fits.
pub const MIN_LOOKAHEAD: usize = crate::utf8::MAX_SEQUENCE_LEN;

/// The default for both stall thresholds.
pub const DEFAULT_STALL_LIMIT: u32 = 1000;

/// Configuration for a [`StreamParser`](crate::StreamParser).
///
/// # Default
///
/// A 4096-byte lookahead, stall thresholds of 1000, and ASCII-only
/// whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ParserOptions {
    /// The size of each of the two input blocks.
    ///
    /// Peeks must stay strictly below this offset. Values below
    /// [`MIN_LOOKAHEAD`] are raised to it.
    ///
    /// # Default
    ///
    /// `4096`
    pub lookahead: usize,

    /// How many peeks in a row, without a consume in between, are allowed
    /// before the parser reports [`StreamError::Stalled`].
    ///
    /// This catches grammar loops that forget to advance. It is not a limit on
    /// how far ahead a caller may look.
    ///
    /// # Default
    ///
    /// `1000`
    ///
    /// [`StreamError::Stalled`]: crate::StreamError::Stalled
    pub stall_limit: u32,

    /// How many consumes past the end of the stream are allowed before the
    /// parser reports [`StreamError::StalledAtEof`].
    ///
    /// # Default
    ///
    /// `1000`
    ///
    /// [`StreamError::StalledAtEof`]: crate::StreamError::StalledAtEof
    pub eof_stall_limit: u32,

    /// Whether [`consume_whitespace`] skips every Unicode whitespace
    /// character rather than only space, tab, carriage return and line feed.
    ///
    /// # Default
    ///
    /// `false`
    ///
    /// [`consume_whitespace`]: crate::StreamParser::consume_whitespace
    pub allow_unicode_whitespace: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            lookahead: DEFAULT_LOOKAHEAD,
            stall_limit: DEFAULT_STALL_LIMIT,
            eof_stall_limit: DEFAULT_STALL_LIMIT,
            allow_unicode_whitespace: false,
        }
    }
}
