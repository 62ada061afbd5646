//! Byte-string values in two representations.
//!
//! - [`Text`] is immutable and compact: one exact-size allocation, or none at
//!   all for the empty value. Every "mutation" returns a new value.
//! - [`TextChain`] is mutable and append-friendly: a chain of fixed-capacity
//!   blocks that grows by adding blocks, never by moving bytes it already
//!   holds.
//!
//! A grammar typically accumulates a token into a [`TextChain`] while
//! scanning and freezes it into a [`Text`] once the token is complete.
//!
//! Both implement [`TextBuffer`], which supplies the operations that only need
//! to read bytes in order: comparison, byte indexing, conversion to a
//! NUL-terminated buffer and decoding into code points. None of these can
//! fail; out-of-range reads yield `0` and out-of-range substrings are padded
//! with `0` bytes.

mod chain;
mod immutable;

use alloc::vec::Vec;
use core::cmp::Ordering;

pub use chain::{DEFAULT_BLOCK_CAPACITY, TextChain};
pub use immutable::Text;

use crate::utf8::{self, CodePoint, Decoded, MAX_SEQUENCE_LEN};

/// Read access shared by [`Text`] and [`TextChain`].
pub trait TextBuffer {
    /// The stored bytes as consecutive runs, in order.
    fn chunks(&self) -> impl Iterator<Item = &[u8]> + Clone;

    /// The length in bytes.
    fn len(&self) -> usize;

    /// Returns `true` if the value holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The byte at `index`, or `0` if `index` is out of range.
    fn char_at(&self, index: usize) -> u8 {
        let mut index = index;
        for chunk in self.chunks() {
            if let Some(&byte) = chunk.get(index) {
                return byte;
            }
            index -= chunk.len();
        }
        0
    }

    /// Byte-wise lexicographic comparison. The empty value sorts first.
    fn compare<T: TextBuffer>(&self, other: &T) -> Ordering {
        compare_chunks(self.chunks(), other.chunks())
    }

    /// Copies the bytes into a contiguous vector.
    fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for chunk in self.chunks() {
            out.extend_from_slice(chunk);
        }
        out
    }

    /// Copies the bytes into a new buffer with a trailing NUL.
    fn to_c_string(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() + 1);
        for chunk in self.chunks() {
            out.extend_from_slice(chunk);
        }
        out.push(0);
        out
    }

    /// Iterates over the decoded characters. Malformed input yields
    /// [`Decoded::InvalidByte`] items rather than stopping.
    fn chars(&self) -> impl Iterator<Item = Decoded> {
        Chars {
            chunks: self.chunks(),
            head: &[],
        }
    }

    /// Decodes the value into code points, with malformed bytes in their
    /// tagged `0xDCxx` form.
    fn decode(&self) -> Vec<CodePoint> {
        self.chars().map(Decoded::code_point).collect()
    }
}

fn compare_chunks<'a, 'b>(
    mut lhs: impl Iterator<Item = &'a [u8]>,
    mut rhs: impl Iterator<Item = &'b [u8]>,
) -> Ordering {
    let mut left: &[u8] = &[];
    let mut right: &[u8] = &[];
    loop {
        while left.is_empty() {
            match lhs.next() {
                Some(chunk) => left = chunk,
                None => break,
            }
        }
        while right.is_empty() {
            match rhs.next() {
                Some(chunk) => right = chunk,
                None => break,
            }
        }
        match (left.is_empty(), right.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        let n = left.len().min(right.len());
        match left[..n].cmp(&right[..n]) {
            Ordering::Equal => {
                left = &left[n..];
                right = &right[n..];
            }
            unequal => return unequal,
        }
    }
}

/// Copies `count` bytes starting at `start`, zero-filling whatever lies past
/// the end of the input.
fn copy_padded<'a>(chunks: impl Iterator<Item = &'a [u8]>, start: usize, count: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(count);
    let mut skip = start;
    for chunk in chunks {
        if out.len() == count {
            break;
        }
        if skip >= chunk.len() {
            skip -= chunk.len();
            continue;
        }
        let available = &chunk[skip..];
        skip = 0;
        let take = (count - out.len()).min(available.len());
        out.extend_from_slice(&available[..take]);
    }
    out.resize(count, 0);
    out
}

/// Decodes across chunk boundaries by assembling a small window whenever the
/// current chunk is too short to hold a full sequence.
struct Chars<'a, I> {
    chunks: I,
    head: &'a [u8],
}

impl<'a, I> Iterator for Chars<'a, I>
where
    I: Iterator<Item = &'a [u8]> + Clone,
{
    type Item = Decoded;

    fn next(&mut self) -> Option<Decoded> {
        while self.head.is_empty() {
            self.head = self.chunks.next()?;
        }

        if self.head.len() >= MAX_SEQUENCE_LEN {
            let (decoded, used) = utf8::decode(self.head);
            self.head = &self.head[used..];
            return Some(decoded);
        }

        let mut window = [0u8; MAX_SEQUENCE_LEN];
        let mut filled = 0;
        for chunk in core::iter::once(self.head).chain(self.chunks.clone()) {
            let take = (MAX_SEQUENCE_LEN - filled).min(chunk.len());
            window[filled..filled + take].copy_from_slice(&chunk[..take]);
            filled += take;
            if filled == MAX_SEQUENCE_LEN {
                break;
            }
        }

        let (decoded, mut used) = utf8::decode(&window[..filled]);
        while used > 0 {
            if self.head.is_empty() {
                self.head = self.chunks.next().unwrap_or_default();
            }
            let step = used.min(self.head.len());
            self.head = &self.head[step..];
            used -= step;
        }
        Some(decoded)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use super::*;

    #[test]
    fn compares_across_uneven_chunks() {
        let a: Vec<&[u8]> = vec![b"ab", b"", b"cd"];
        let b: Vec<&[u8]> = vec![b"a", b"bc", b"d"];
        assert_eq!(compare_chunks(a.iter().copied(), b.iter().copied()), Ordering::Equal);

        let c: Vec<&[u8]> = vec![b"abc"];
        assert_eq!(compare_chunks(c.iter().copied(), b.iter().copied()), Ordering::Less);
        assert_eq!(compare_chunks(b.iter().copied(), c.iter().copied()), Ordering::Greater);
        assert_eq!(
            compare_chunks(core::iter::empty(), core::iter::empty()),
            Ordering::Equal
        );
    }

    #[test]
    fn pads_past_the_end() {
        let chunks: Vec<&[u8]> = vec![b"he", b"llo"];
        assert_eq!(copy_padded(chunks.iter().copied(), 1, 3), b"ell");
        assert_eq!(copy_padded(chunks.iter().copied(), 3, 4), b"lo\0\0");
        assert_eq!(copy_padded(chunks.iter().copied(), 9, 2), b"\0\0");
        assert!(copy_padded(chunks.iter().copied(), 0, 0).is_empty());
    }

    #[test]
    fn decodes_sequences_split_between_chunks() {
        // Two 2-byte characters, each split across a chunk boundary.
        let bytes = "\u{3BA}\u{3CC}".as_bytes();
        let chunks: Vec<&[u8]> = vec![&bytes[..1], &bytes[1..3], &bytes[3..]];
        let chars = Chars {
            chunks: chunks.iter().copied(),
            head: &[],
        };
        let decoded: Vec<Decoded> = chars.collect();
        assert_eq!(decoded, vec![Decoded::Char(0x3BA), Decoded::Char(0x3CC)]);
    }
}
