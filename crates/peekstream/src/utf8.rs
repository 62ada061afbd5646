//! UTF-8 codec over bare code points.
//!
//! The standard library only encodes and decodes Unicode scalar values
//! (`char`). A byte-stream parser needs something looser: it must be able to
//! round-trip every value in `0..=0x10FFFF` (surrogates included), and it must
//! report malformed input in-band instead of refusing it, so that the grammar
//! layer can decide what to do with a stray byte.
//!
//! Decoding never reads more than four bytes and never panics. Malformed input
//! is reported as [`Decoded::InvalidByte`], tagged with the offending byte, and
//! always with a consumed count of at least one so that any loop built on
//! [`decode`] or [`decode_size`] makes forward progress.

use core::fmt;

/// A Unicode code point, or one of the out-of-band sentinel values.
pub type CodePoint = u32;

/// The largest code point the codec will encode.
pub const MAX_CODE_POINT: CodePoint = 0x10_FFFF;

/// Legacy sentinel for end of stream; see [`Decoded::code_point`].
pub const END_OF_STREAM: CodePoint = 0xFFFF_FFFF;

/// Legacy tag for an undecodable byte; the low eight bits hold the byte.
pub const BAD_BYTE_TAG: CodePoint = 0xDC00;

/// The longest UTF-8 sequence (RFC 3629).
pub const MAX_SEQUENCE_LEN: usize = 4;

/// The result of decoding one UTF-8 sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decoded {
    /// A well-formed sequence and the code point it encodes.
    Char(CodePoint),
    /// The byte that made the sequence malformed. This is either an invalid
    /// leading byte or the first continuation byte that lacks the `10` prefix.
    InvalidByte(u8),
    /// There was no input left to decode.
    EndOfStream,
}

impl Decoded {
    /// Collapses the result into a single `u32`.
    ///
    /// Invalid bytes map to `0xDC00 | byte` and end of stream maps to
    /// [`END_OF_STREAM`]. This form cannot tell a tagged bad byte from a
    /// decoded low surrogate; use the enum whenever that matters.
    #[must_use]
    pub fn code_point(self) -> CodePoint {
        match self {
            Decoded::Char(cp) => cp,
            Decoded::InvalidByte(byte) => BAD_BYTE_TAG | CodePoint::from(byte),
            Decoded::EndOfStream => END_OF_STREAM,
        }
    }

    /// Returns the decoded `char`, if this is a valid Unicode scalar value.
    #[must_use]
    pub fn as_char(self) -> Option<char> {
        match self {
            Decoded::Char(cp) => char::from_u32(cp),
            _ => None,
        }
    }

    /// Returns `true` if this decoded to exactly `ch`.
    #[must_use]
    pub fn is(self, ch: char) -> bool {
        self == Decoded::Char(ch as CodePoint)
    }

    /// Returns `true` for [`Decoded::EndOfStream`].
    #[must_use]
    pub fn is_end_of_stream(self) -> bool {
        matches!(self, Decoded::EndOfStream)
    }

    /// Returns `true` for [`Decoded::InvalidByte`].
    #[must_use]
    pub fn is_invalid(self) -> bool {
        matches!(self, Decoded::InvalidByte(_))
    }
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Decoded::Char(cp) => f.write_str(&crate::location::format_character(cp)),
            Decoded::InvalidByte(byte) => write!(f, "invalid UTF-8 byte 0x{byte:02X}"),
            Decoded::EndOfStream => f.write_str("end of stream"),
        }
    }
}

/// Up to four encoded bytes, as produced by [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Utf8Bytes {
    bytes: [u8; MAX_SEQUENCE_LEN],
    len: u8,
}

impl Utf8Bytes {
    /// The encoded bytes. Empty if the code point was not encodable.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// The number of encoded bytes, `0` for an unencodable code point.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Returns `true` if nothing was encoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for Utf8Bytes {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Encodes `code_point` as UTF-8.
///
/// Code points at or above `0x110000` are not encodable: the result is empty
/// and its backing bytes are all zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode(code_point: CodePoint) -> Utf8Bytes {
    let cp = code_point;
    let mut bytes = [0u8; MAX_SEQUENCE_LEN];
    let len = match cp {
        0..0x80 => {
            bytes[0] = cp as u8;
            1
        }
        0x80..0x800 => {
            bytes[0] = 0xC0 | (cp >> 6) as u8;
            bytes[1] = 0x80 | (cp & 0x3F) as u8;
            2
        }
        0x800..0x1_0000 => {
            bytes[0] = 0xE0 | (cp >> 12) as u8;
            bytes[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            bytes[2] = 0x80 | (cp & 0x3F) as u8;
            3
        }
        0x1_0000..0x11_0000 => {
            bytes[0] = 0xF0 | (cp >> 18) as u8;
            bytes[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
            bytes[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            bytes[3] = 0x80 | (cp & 0x3F) as u8;
            4
        }
        _ => 0,
    };
    Utf8Bytes { bytes, len }
}

/// The number of bytes [`encode`] would produce for `code_point`.
#[must_use]
pub fn encode_size(code_point: CodePoint) -> usize {
    match code_point {
        0..0x80 => 1,
        0x80..0x800 => 2,
        0x800..0x1_0000 => 3,
        0x1_0000..0x11_0000 => 4,
        _ => 0,
    }
}

/// Decodes the UTF-8 sequence at the start of `input`.
///
/// Returns the decoded value and the number of bytes it occupies:
///
/// - empty input yields `(Decoded::Char(0), 0)`;
/// - an invalid leading byte (a bare continuation byte, `0xF8..=0xFF`, or a
///   four-byte lead whose value would exceed `0x10FFFF`) yields
///   `InvalidByte(lead)` and a count of 1;
/// - a continuation byte without the `10` prefix yields `InvalidByte(byte)`
///   and the count of bytes validated before it;
/// - a sequence cut short by the end of `input` yields `InvalidByte(lead)` and
///   the count of bytes present.
///
/// Overlong forms and surrogates are decoded as-is.
#[must_use]
pub fn decode(input: &[u8]) -> (Decoded, usize) {
    let Some(&lead) = input.first() else {
        return (Decoded::Char(0), 0);
    };

    let (len, mut cp) = match lead {
        0x00..=0x7F => return (Decoded::Char(CodePoint::from(lead)), 1),
        0xC0..=0xDF => (2, CodePoint::from(lead & 0x1F)),
        0xE0..=0xEF => (3, CodePoint::from(lead & 0x0F)),
        0xF0..=0xF7 => (4, CodePoint::from(lead & 0x07)),
        _ => return (Decoded::InvalidByte(lead), 1),
    };

    for used in 1..len {
        match input.get(used) {
            Some(&byte) if byte & 0xC0 == 0x80 => {
                cp = (cp << 6) | CodePoint::from(byte & 0x3F);
            }
            Some(&byte) => return (Decoded::InvalidByte(byte), used),
            None => return (Decoded::InvalidByte(lead), used),
        }
    }

    if cp > MAX_CODE_POINT {
        return (Decoded::InvalidByte(lead), 1);
    }
    (Decoded::Char(cp), len)
}

/// The number of bytes [`decode`] consumes at the start of `input`.
///
/// Always at least 1 for non-empty input.
#[must_use]
pub fn decode_size(input: &[u8]) -> usize {
    decode(input).1
}

/// ISO control characters: `U+0000..=U+001F` and `U+007F..=U+009F`.
#[must_use]
pub fn is_iso_control(code_point: CodePoint) -> bool {
    matches!(code_point, 0x00..=0x1F | 0x7F..=0x9F)
}

/// Unicode `White_Space` characters.
#[must_use]
pub fn is_whitespace(code_point: CodePoint) -> bool {
    matches!(
        code_point,
        0x09..=0x0D
            | 0x20
            | 0x85
            | 0xA0
            | 0x1680
            | 0x2000..=0x200A
            | 0x2028
            | 0x2029
            | 0x202F
            | 0x205F
            | 0x3000
    )
}
