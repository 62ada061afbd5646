use alloc::{boxed::Box, string::String, vec::Vec};
use core::{cmp::Ordering, fmt};

use bstr::BStr;

use super::{TextBuffer, TextChain, copy_padded};
use crate::utf8::{self, CodePoint};

/// An immutable byte string.
///
/// The bytes live in a single allocation sized exactly to the content. The
/// empty value owns no allocation at all, so every empty `Text` is the same
/// value no matter how it was produced.
///
/// Operations that would modify the string return a new `Text` and leave
/// `self` untouched.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Text {
    bytes: Option<Box<[u8]>>,
}

impl Text {
    /// The empty value.
    pub const EMPTY: Text = Text { bytes: None };

    /// Creates an empty value.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Copies `bytes` into a new value.
    #[must_use]
    pub fn wrap(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }

    pub(super) fn from_vec(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            Self::EMPTY
        } else {
            Self {
                bytes: Some(bytes.into_boxed_slice()),
            }
        }
    }

    /// Builds a value from a sequence of code points. Code points that cannot
    /// be encoded are skipped.
    #[must_use]
    pub fn encode(code_points: &[CodePoint]) -> Self {
        TextChain::encode(code_points).to_text()
    }

    /// The bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_deref().unwrap_or_default()
    }

    /// Returns a copy with the UTF-8 encoding of `code_point` appended.
    ///
    /// A code point above `0x10FFFF` encodes to nothing, so the copy equals
    /// `self`.
    #[must_use]
    pub fn append(&self, code_point: CodePoint) -> Self {
        self.append_bytes(utf8::encode(code_point).as_bytes())
    }

    /// Returns a copy with `bytes` appended.
    #[must_use]
    pub fn append_bytes(&self, bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return self.clone();
        }
        let mut out = Vec::with_capacity(self.len() + bytes.len());
        out.extend_from_slice(self.as_bytes());
        out.extend_from_slice(bytes);
        Self::from_vec(out)
    }

    /// Returns the concatenation of `self` and `other`.
    #[must_use]
    pub fn concat(&self, other: &Text) -> Self {
        self.append_bytes(other.as_bytes())
    }

    /// Returns `count` bytes starting at `start`. Positions past the end read
    /// as `0`, so the result is always exactly `count` bytes long.
    #[must_use]
    pub fn substring(&self, start: usize, count: usize) -> Self {
        Self::from_vec(copy_padded(self.chunks(), start, count))
    }

    /// Copies the value into a new [`TextChain`].
    #[must_use]
    pub fn to_chain(&self) -> TextChain {
        TextChain::wrap(self.as_bytes())
    }
}

impl TextBuffer for Text {
    fn chunks(&self) -> impl Iterator<Item = &[u8]> + Clone {
        self.bytes.as_deref().into_iter()
    }

    fn len(&self) -> usize {
        self.as_bytes().len()
    }
}

impl PartialOrd for Text {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Text {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl PartialEq<TextChain> for Text {
    fn eq(&self, other: &TextChain) -> bool {
        self.len() == other.len() && self.compare(other) == Ordering::Equal
    }
}

impl AsRef<[u8]> for Text {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<&[u8]> for Text {
    fn from(bytes: &[u8]) -> Self {
        Self::wrap(bytes)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::wrap(s.as_bytes())
    }
}

impl From<Vec<u8>> for Text {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::from_vec(s.into_bytes())
    }
}

impl From<&TextChain> for Text {
    fn from(chain: &TextChain) -> Self {
        chain.to_text()
    }
}

impl FromIterator<char> for Text {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        TextChain::from_iter(iter).to_text()
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(BStr::new(self.as_bytes()), f)
    }
}

/// Writes the bytes as UTF-8, substituting U+FFFD for malformed sequences.
impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(BStr::new(self.as_bytes()), f)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, vec};

    use rstest::rstest;

    use super::*;
    use crate::utf8::Decoded;

    #[test]
    fn empty_values_are_canonical() {
        assert_eq!(Text::new(), Text::EMPTY);
        assert_eq!(Text::wrap(b""), Text::EMPTY);
        assert_eq!(Text::from(Vec::new()), Text::EMPTY);
        assert_eq!(Text::from("abc").substring(1, 0), Text::EMPTY);
        assert_eq!(Text::EMPTY.concat(&Text::EMPTY), Text::EMPTY);
        assert_eq!(Text::EMPTY.append(0x11_0000), Text::EMPTY);
        assert!(Text::EMPTY.is_empty());
        assert_eq!(Text::EMPTY.to_c_string(), vec![0]);
    }

    #[test]
    fn append_leaves_the_receiver_alone() {
        let base = Text::from("a");
        let grown = base.append(0x3BA);
        assert_eq!(base.as_bytes(), b"a");
        assert_eq!(grown.as_bytes(), "a\u{3BA}".as_bytes());
        assert_eq!(base.append(0x11_0000), base);
    }

    #[test]
    fn concat_copies_both_sides() {
        let a = Text::from("foo");
        let b = Text::from("bar");
        let ab = a.concat(&b);
        assert_eq!(ab.as_bytes(), b"foobar");
        assert_eq!(a.as_bytes(), b"foo");
        assert_eq!(b.as_bytes(), b"bar");
    }

    #[rstest]
    #[case("abc", "abd", Ordering::Less)]
    #[case("abc", "abc", Ordering::Equal)]
    #[case("abcd", "abc", Ordering::Greater)]
    #[case("", "a", Ordering::Less)]
    #[case("", "", Ordering::Equal)]
    fn compares_bytewise(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(Text::from(a).compare(&Text::from(b)), expected);
        assert_eq!(Text::from(a).cmp(&Text::from(b)), expected);
    }

    #[test]
    fn indexes_with_zero_past_the_end() {
        let text = Text::from("hi");
        assert_eq!(text.char_at(1), b'i');
        assert_eq!(text.char_at(2), 0);
        assert_eq!(text.substring(1, 3).as_bytes(), b"i\0\0");
    }

    #[test]
    fn encodes_and_decodes_code_points() {
        let text = Text::encode(&[0x41, 0x11_0000, 0x1F600]);
        assert_eq!(text.as_bytes(), "A\u{1F600}".as_bytes());
        assert_eq!(text.decode(), vec![0x41, 0x1F600]);

        let broken = Text::wrap(&[b'a', 0xF9, b'b']);
        assert_eq!(broken.decode(), vec![0x61, 0xDCF9, 0x62]);
        assert_eq!(
            broken.chars().collect::<Vec<_>>(),
            vec![Decoded::Char(0x61), Decoded::InvalidByte(0xF9), Decoded::Char(0x62)]
        );
    }

    #[test]
    fn formats_lossily() {
        let text = Text::wrap(&[b'o', b'k', 0xFF]);
        assert_eq!(format!("{text}"), "ok\u{FFFD}");
        assert_eq!(format!("{text:?}"), "\"ok\\xff\"");
    }
}
