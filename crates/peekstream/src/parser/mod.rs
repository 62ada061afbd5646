//! The buffered lookahead stream parser.
//!
//! [`StreamParser`] reads its [`ByteSource`] in blocks of
//! [`ParserOptions::lookahead`] bytes into two alternating buffers. The cursor
//! always sits in the *active* block; lookahead that runs past its end reads
//! from the *other* block, which holds the bytes that follow. When the cursor
//! leaves the active block the two swap roles and the block just left behind
//! is refilled, so bytes within the lookahead window are never overwritten
//! while they can still be peeked.
//!
//! The parser keeps a 1-based line and column for diagnostics and watches
//! for two caller bugs: peeking over and over without consuming, and
//! consuming over and over after the end of the stream. Both are reported as
//! [`StreamError`]s once the configured threshold is passed.
//!
//! Every fallible operation returns its error and also records it in
//! [`StreamParser::last_error`]; an operation that succeeds clears it.

mod error;
mod options;

use alloc::{
    boxed::Box,
    string::{String, ToString},
    sync::Arc,
    vec,
    vec::Vec,
};
use core::fmt;

pub use error::StreamError;
pub use options::{DEFAULT_LOOKAHEAD, DEFAULT_STALL_LIMIT, MIN_LOOKAHEAD, ParserOptions};
use tracing::{debug, error, trace, warn};

use crate::{
    error::Diagnostic,
    location::Location,
    source::ByteSource,
    utf8::{self, Decoded, MAX_SEQUENCE_LEN},
};

/// The source name used when none is given.
pub const UNKNOWN_SOURCE: &str = "(unknown)";

/// A lookahead parser over a [`ByteSource`].
///
/// Nothing is read or allocated until the first peek or consume.
pub struct StreamParser<S> {
    source: S,
    name: Arc<str>,
    options: ParserOptions,
    lookahead: usize,
    blocks: [Box<[u8]>; 2],
    filled: [usize; 2],
    loaded: [bool; 2],
    active: usize,
    cursor: usize,
    exhausted: bool,
    at_eof: bool,
    eof_count: u32,
    look_count: u32,
    line: u32,
    column: u32,
    last_error: Option<StreamError>,
}

impl<S: ByteSource> StreamParser<S> {
    /// Creates a parser with default options. A `None` name becomes
    /// [`UNKNOWN_SOURCE`].
    pub fn new(name: Option<&str>, source: S) -> Self {
        Self::with_options(name, source, ParserOptions::default())
    }

    /// Creates a parser with the given options.
    pub fn with_options(name: Option<&str>, source: S, options: ParserOptions) -> Self {
        let lookahead = options.lookahead.max(MIN_LOOKAHEAD);
        let name: Arc<str> = Arc::from(name.unwrap_or(UNKNOWN_SOURCE));
        trace!(%name, lookahead, "opening stream parser");
        Self {
            source,
            name,
            options,
            lookahead,
            blocks: [Box::default(), Box::default()],
            filled: [0; 2],
            loaded: [false; 2],
            active: 0,
            cursor: 0,
            exhausted: false,
            at_eof: false,
            eof_count: 0,
            look_count: 0,
            line: 1,
            column: 1,
            last_error: None,
        }
    }

    /// Returns the byte `offset` positions past the cursor without consuming
    /// it, or `None` past the end of the stream.
    ///
    /// # Errors
    ///
    /// [`StreamError::LookaheadTooLarge`] if `offset` is not below the
    /// lookahead limit, and [`StreamError::Stalled`] once too many peeks have
    /// happened since the last consume.
    pub fn peek(&mut self, offset: usize) -> Result<Option<u8>, StreamError> {
        self.begin_peek(offset)?;
        Ok(self.byte_at(offset))
    }

    /// Returns up to `n` bytes of lookahead. The result is shorter than `n`
    /// only when the stream ends first.
    ///
    /// # Errors
    ///
    /// As for [`peek`](Self::peek), with `n` checked against the limit.
    pub fn peek_n(&mut self, n: usize) -> Result<Vec<u8>, StreamError> {
        self.begin_peek(n)?;
        let mut out = Vec::with_capacity(n);
        for offset in 0..n {
            match self.byte_at(offset) {
                Some(byte) => out.push(byte),
                None => break,
            }
        }
        Ok(out)
    }

    /// Decodes the character at the cursor without consuming it.
    ///
    /// # Errors
    ///
    /// [`StreamError::Stalled`], as for [`peek`](Self::peek).
    pub fn peek_char(&mut self) -> Result<Decoded, StreamError> {
        self.begin_peek(0)?;
        Ok(self.decode_at_cursor().0)
    }

    /// Returns `true` if the upcoming bytes are exactly `needle`.
    ///
    /// # Errors
    ///
    /// [`StreamError::LookaheadTooLarge`] if `needle` is not shorter than the
    /// lookahead limit; [`StreamError::Stalled`] as for [`peek`](Self::peek).
    pub fn peek_str(&mut self, needle: &[u8]) -> Result<bool, StreamError> {
        self.begin_peek(needle.len())?;
        Ok(needle
            .iter()
            .enumerate()
            .all(|(offset, &expected)| self.byte_at(offset) == Some(expected)))
    }

    /// Consumes `needle` if the upcoming bytes match it exactly. On a mismatch
    /// nothing is consumed and the position is unchanged.
    ///
    /// An empty needle always matches but consumes nothing, so it does not
    /// reset the stall watchdog.
    ///
    /// # Errors
    ///
    /// As for [`peek_str`](Self::peek_str), and
    /// [`StreamError::StalledAtEof`] as for [`consume_n`](Self::consume_n).
    pub fn peek_and_consume(&mut self, needle: &[u8]) -> Result<bool, StreamError> {
        if !self.peek_str(needle)? {
            return Ok(false);
        }
        if !needle.is_empty() {
            self.consume_n(needle.len())?;
        }
        Ok(true)
    }

    /// Consumes and returns the byte at the cursor.
    ///
    /// At the end of the stream this returns `None` and marks the parser as
    /// [at EOF](Self::at_eof).
    ///
    /// # Errors
    ///
    /// [`StreamError::StalledAtEof`] once consume has been called too many
    /// times after the end of the stream.
    pub fn consume(&mut self) -> Result<Option<u8>, StreamError> {
        self.begin_consume()?;
        match self.byte_at(0) {
            Some(byte) => {
                self.track_byte(byte);
                self.advance();
                Ok(Some(byte))
            }
            None => {
                self.at_eof = true;
                Ok(None)
            }
        }
    }

    /// Consumes `n` bytes, stopping early at the end of the stream.
    ///
    /// Unlike peeking, `n` is not bounded by the lookahead limit.
    ///
    /// # Errors
    ///
    /// As for [`consume`](Self::consume). The check happens once per call.
    pub fn consume_n(&mut self, n: usize) -> Result<(), StreamError> {
        self.begin_consume()?;
        for _ in 0..n {
            let Some(byte) = self.byte_at(0) else {
                self.at_eof = true;
                break;
            };
            self.track_byte(byte);
            self.advance();
        }
        Ok(())
    }

    /// Consumes and returns one character.
    ///
    /// A malformed sequence is consumed up to, but not including, the byte
    /// that broke it (at least one byte) and returned as
    /// [`Decoded::InvalidByte`]. At the end of the stream this returns
    /// [`Decoded::EndOfStream`] and marks the parser as at EOF.
    ///
    /// # Errors
    ///
    /// As for [`consume`](Self::consume).
    pub fn consume_char(&mut self) -> Result<Decoded, StreamError> {
        self.begin_consume()?;
        let (decoded, used) = self.decode_at_cursor();
        if used == 0 {
            self.at_eof = true;
            return Ok(Decoded::EndOfStream);
        }
        for _ in 0..used {
            if let Some(byte) = self.byte_at(0) {
                self.track_byte(byte);
            }
            self.advance();
        }
        Ok(decoded)
    }

    /// Consumes whitespace up to the next non-whitespace character or the end
    /// of the stream, and returns how many characters were skipped.
    ///
    /// Whitespace is space, tab, carriage return and line feed, or any Unicode
    /// whitespace when [`ParserOptions::allow_unicode_whitespace`] is set.
    ///
    /// # Errors
    ///
    /// Only errors already pending from earlier misuse, such as a stall.
    pub fn consume_whitespace(&mut self) -> Result<usize, StreamError> {
        let mut skipped = 0;
        if self.options.allow_unicode_whitespace {
            while let Decoded::Char(cp) = self.peek_char()? {
                if !utf8::is_whitespace(cp) {
                    break;
                }
                self.consume_char()?;
                skipped += 1;
            }
        } else {
            while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.peek(0)? {
                self.consume()?;
                skipped += 1;
            }
        }
        Ok(skipped)
    }

    /// Returns `true` once a consume has been attempted at the end of the
    /// stream.
    #[must_use]
    pub fn at_eof(&self) -> bool {
        self.at_eof
    }

    /// A snapshot of the current position.
    #[must_use]
    pub fn location(&self) -> Location {
        Location::new(Arc::clone(&self.name), self.line, self.column)
    }

    /// Formats `message` as a diagnostic at the current position and logs it.
    #[must_use]
    pub fn report(&self, message: &str) -> String {
        error!(
            name = %self.name,
            line = self.line,
            column = self.column,
            "{message}"
        );
        Diagnostic::at(self, message).to_string()
    }

    /// The error from the most recent operation, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<StreamError> {
        self.last_error
    }

    /// The current 1-based line.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The current 1-based column.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// The source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The options the parser was created with.
    #[must_use]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// The effective lookahead limit.
    #[must_use]
    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Borrows the byte source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Drops the parser and returns the byte source.
    pub fn into_source(self) -> S {
        self.source
    }

    fn fail<T>(&mut self, err: StreamError) -> Result<T, StreamError> {
        self.last_error = Some(err);
        Err(err)
    }

    fn begin_peek(&mut self, span: usize) -> Result<(), StreamError> {
        self.last_error = None;
        if span >= self.lookahead {
            return self.fail(StreamError::LookaheadTooLarge {
                requested: span,
                limit: self.lookahead,
            });
        }
        self.look_count = self.look_count.saturating_add(1);
        if self.look_count > self.options.stall_limit {
            if self.look_count == self.options.stall_limit.saturating_add(1) {
                warn!(
                    name = %self.name,
                    line = self.line,
                    column = self.column,
                    peeks = self.look_count,
                    "parser stalled without consuming"
                );
            }
            return self.fail(StreamError::Stalled);
        }
        Ok(())
    }

    fn begin_consume(&mut self) -> Result<(), StreamError> {
        self.last_error = None;
        self.look_count = 0;
        if self.at_eof {
            self.eof_count = self.eof_count.saturating_add(1);
            if self.eof_count > self.options.eof_stall_limit {
                if self.eof_count == self.options.eof_stall_limit.saturating_add(1) {
                    warn!(
                        name = %self.name,
                        consumes = self.eof_count,
                        "parser stalled at end of stream"
                    );
                }
                return self.fail(StreamError::StalledAtEof);
            }
        }
        Ok(())
    }

    /// The byte `offset` positions past the cursor, loading the other block
    /// if the lookahead reaches into it.
    fn byte_at(&mut self, offset: usize) -> Option<u8> {
        debug_assert!(offset < self.lookahead);
        let active = self.active;
        self.ensure_loaded(active);

        let index = self.cursor + offset;
        if index < self.lookahead {
            return if index < self.filled[active] {
                Some(self.blocks[active][index])
            } else {
                None
            };
        }
        // A short block is the last one; nothing follows it.
        if self.filled[active] < self.lookahead {
            return None;
        }

        let other = active ^ 1;
        self.ensure_loaded(other);
        let index = index - self.lookahead;
        if index < self.filled[other] {
            Some(self.blocks[other][index])
        } else {
            None
        }
    }

    fn decode_at_cursor(&mut self) -> (Decoded, usize) {
        let mut window = [0u8; MAX_SEQUENCE_LEN];
        let mut len = 0;
        while len < MAX_SEQUENCE_LEN {
            match self.byte_at(len) {
                Some(byte) => {
                    window[len] = byte;
                    len += 1;
                }
                None => break,
            }
        }
        if len == 0 {
            return (Decoded::EndOfStream, 0);
        }
        utf8::decode(&window[..len])
    }

    /// Moves the cursor one byte forward. The byte must exist.
    fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor == self.lookahead {
            self.swap();
        }
    }

    fn swap(&mut self) {
        let left = self.active;
        let next = left ^ 1;
        self.ensure_loaded(next);
        self.active = next;
        self.cursor -= self.lookahead;
        self.refill(left);
    }

    fn ensure_loaded(&mut self, block: usize) {
        if !self.loaded[block] {
            self.refill(block);
        }
    }

    fn refill(&mut self, block: usize) {
        let limit = self.lookahead;
        if self.blocks[block].len() != limit {
            self.blocks[block] = vec![0; limit].into_boxed_slice();
        }
        let read = if self.exhausted {
            0
        } else {
            self.source.read(&mut self.blocks[block][..limit]).min(limit)
        };
        self.filled[block] = read;
        self.loaded[block] = true;
        trace!(block, bytes = read, "refilled block");

        if read < limit && !self.exhausted {
            self.exhausted = true;
            debug!(name = %self.name, "byte source exhausted");
        }
    }

    fn track_byte(&mut self, byte: u8) {
        if byte == b'\n' {
            self.new_line();
        } else if !is_continuation(byte) {
            self.column = self.column.saturating_add(1);
        }
    }

    fn new_line(&mut self) {
        self.line = self.line.saturating_add(1);
        self.column = 1;
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

impl<S> fmt::Debug for StreamParser<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamParser")
            .field("name", &self.name)
            .field("line", &self.line)
            .field("column", &self.column)
            .field("lookahead", &self.lookahead)
            .field("at_eof", &self.at_eof)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
