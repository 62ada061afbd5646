//! Building blocks for hand-written recursive-descent parsers over byte
//! streams.
//!
//! - [`utf8`]: a UTF-8 codec over bare `u32` code points that reports
//!   malformed input in-band.
//! - [`text`]: an immutable byte string ([`Text`]) and a block-chained
//!   growable one ([`TextChain`]).
//! - [`parser`]: [`StreamParser`], a double-buffered reader with bounded
//!   lookahead, line and column tracking, and stall detection.
//!
//! ```rust
//! use peekstream::{Diagnostic, StreamParser};
//!
//! let mut parser = StreamParser::new(Some("input"), &b"true "[..]);
//! assert_eq!(parser.peek_and_consume(b"true"), Ok(true));
//! parser.consume_whitespace().unwrap();
//! assert!(!parser.peek_and_consume(b",").unwrap());
//!
//! let err = Diagnostic::at(&parser, "expected ','");
//! assert_eq!(err.to_string(), "ERROR input:1:6: expected ','");
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod error;
pub mod location;
pub mod parser;
pub mod source;
pub mod text;
pub mod utf8;

pub use error::Diagnostic;
pub use location::{Location, format_character, format_location};
pub use parser::{ParserOptions, StreamError, StreamParser};
#[cfg(feature = "std")]
pub use source::ReadSource;
pub use source::{ByteSource, MemorySource};
pub use text::{Text, TextBuffer, TextChain};
pub use utf8::{CodePoint, Decoded};
