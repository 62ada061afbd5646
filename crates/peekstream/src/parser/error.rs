use thiserror::Error;

/// A failed parser operation.
///
/// None of these leave the parser in a bad state: the position is unchanged
/// and the caller may keep going. The most recent one is also available from
/// [`StreamParser::last_error`](crate::StreamParser::last_error).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    /// A peek asked for more lookahead than the parser buffers.
    #[error("lookahead of {requested} bytes exceeds the limit of {limit}")]
    LookaheadTooLarge {
        /// The offset or needle length that was asked for.
        requested: usize,
        /// The exclusive lookahead limit.
        limit: usize,
    },
    /// Consume was called too many times after the end of the stream.
    #[error("stalled at end of stream")]
    StalledAtEof,
    /// Peek was called too many times without an intervening consume.
    #[error("stalled: too many peeks without consuming")]
    Stalled,
}
