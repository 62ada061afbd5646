use alloc::{boxed::Box, vec, vec::Vec};
use core::{cmp::Ordering, fmt};

use bstr::BStr;

use super::{Text, TextBuffer, copy_padded};
use crate::utf8::{self, CodePoint};

/// The capacity of a freshly created block when none is requested.
pub const DEFAULT_BLOCK_CAPACITY: usize = 64;

struct Block {
    bytes: Box<[u8]>,
    used: usize,
}

impl Block {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
            used: 0,
        }
    }

    fn filled(&self) -> &[u8] {
        &self.bytes[..self.used]
    }

    /// Copies as much of `data` as fits and returns how much that was.
    fn push(&mut self, data: &[u8]) -> usize {
        let n = (self.bytes.len() - self.used).min(data.len());
        self.bytes[self.used..self.used + n].copy_from_slice(&data[..n]);
        self.used += n;
        n
    }

    /// Drops the unused tail so nothing more can be written here.
    fn seal(&mut self) {
        if self.used < self.bytes.len() {
            self.bytes = Box::from(self.filled());
        }
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("capacity", &self.bytes.len())
            .field("used", &self.used)
            .field("bytes", &BStr::new(self.filled()))
            .finish()
    }
}

/// A growable byte string stored as a chain of blocks.
///
/// Appending fills the last block and, once it is full, adds a new block sized
/// to the overflow plus the chain's block capacity. Bytes already written are
/// never moved, so a long run of appends costs one copy per byte plus one
/// allocation per block.
///
/// Every block except the last is full. [`TextChain::concat`] keeps that true
/// by trimming the receiving chain's last block before splicing.
pub struct TextChain {
    blocks: Vec<Block>,
    len: usize,
    block_capacity: usize,
}

impl TextChain {
    /// Creates an empty chain with [`DEFAULT_BLOCK_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BLOCK_CAPACITY)
    }

    /// Creates an empty chain whose blocks hold `capacity` bytes. A capacity
    /// of `0` selects [`DEFAULT_BLOCK_CAPACITY`].
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let block_capacity = if capacity == 0 {
            DEFAULT_BLOCK_CAPACITY
        } else {
            capacity
        };
        Self {
            blocks: vec![Block::with_capacity(block_capacity)],
            len: 0,
            block_capacity,
        }
    }

    /// Copies `bytes` into a new chain with room for
    /// [`DEFAULT_BLOCK_CAPACITY`] more bytes before a second block is needed.
    #[must_use]
    pub fn wrap(bytes: &[u8]) -> Self {
        let mut block = Block::with_capacity(bytes.len() + DEFAULT_BLOCK_CAPACITY);
        block.push(bytes);
        Self {
            blocks: vec![block],
            len: bytes.len(),
            block_capacity: DEFAULT_BLOCK_CAPACITY,
        }
    }

    /// Builds a chain from a sequence of code points. Code points that cannot
    /// be encoded are skipped.
    #[must_use]
    pub fn encode(code_points: &[CodePoint]) -> Self {
        let mut chain = Self::new();
        for &cp in code_points {
            chain.append(cp);
        }
        chain
    }

    /// Appends the UTF-8 encoding of `code_point`. A code point above
    /// `0x10FFFF` appends nothing.
    pub fn append(&mut self, code_point: CodePoint) {
        self.append_bytes(utf8::encode(code_point).as_bytes());
    }

    /// Appends raw bytes.
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.len += bytes.len();

        let written = match self.blocks.last_mut() {
            Some(tail) => tail.push(bytes),
            None => 0,
        };
        let rest = &bytes[written..];
        if !rest.is_empty() {
            let mut block = Block::with_capacity(rest.len() + self.block_capacity);
            block.push(rest);
            self.blocks.push(block);
        }
    }

    /// Moves the blocks of `other` onto the end of this chain.
    ///
    /// No bytes are copied except, when this chain's last block is partly
    /// full, that block's content, which is trimmed to size so that `other`'s
    /// first block can follow it directly.
    pub fn concat(&mut self, mut other: TextChain) {
        if other.len == 0 {
            return;
        }
        if self.len == 0 {
            self.blocks.clear();
        } else if let Some(tail) = self.blocks.last_mut() {
            tail.seal();
        }
        self.blocks.append(&mut other.blocks);
        self.len += other.len;
    }

    /// Copies the content into an immutable [`Text`].
    #[must_use]
    pub fn to_text(&self) -> Text {
        Text::from_vec(self.to_vec())
    }

    /// Returns `count` bytes starting at `start` as a new chain. Positions
    /// past the end read as `0`.
    #[must_use]
    pub fn substring(&self, start: usize, count: usize) -> Self {
        let mut out = Self::with_capacity(self.block_capacity);
        out.append_bytes(&copy_padded(self.chunks(), start, count));
        out
    }

    /// The block capacity used for growth.
    #[must_use]
    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// The `(used, capacity)` pair of every block, in order.
    #[must_use]
    pub fn block_lengths(&self) -> Vec<(usize, usize)> {
        self.blocks
            .iter()
            .map(|block| (block.used, block.bytes.len()))
            .collect()
    }
}

impl TextBuffer for TextChain {
    fn chunks(&self) -> impl Iterator<Item = &[u8]> + Clone {
        self.blocks.iter().map(Block::filled)
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl Default for TextChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones into a single block holding the whole content.
impl Clone for TextChain {
    fn clone(&self) -> Self {
        let mut block = Block::with_capacity(self.len + self.block_capacity);
        for chunk in self.chunks() {
            block.push(chunk);
        }
        Self {
            blocks: vec![block],
            len: self.len,
            block_capacity: self.block_capacity,
        }
    }
}

impl PartialEq for TextChain {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.compare(other) == Ordering::Equal
    }
}

impl Eq for TextChain {}

impl PartialEq<Text> for TextChain {
    fn eq(&self, other: &Text) -> bool {
        other == self
    }
}

impl PartialOrd for TextChain {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TextChain {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl From<&Text> for TextChain {
    fn from(text: &Text) -> Self {
        text.to_chain()
    }
}

impl From<&[u8]> for TextChain {
    fn from(bytes: &[u8]) -> Self {
        Self::wrap(bytes)
    }
}

impl From<&str> for TextChain {
    fn from(s: &str) -> Self {
        Self::wrap(s.as_bytes())
    }
}

impl FromIterator<char> for TextChain {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        let mut chain = Self::new();
        chain.extend(iter);
        chain
    }
}

impl Extend<char> for TextChain {
    fn extend<T: IntoIterator<Item = char>>(&mut self, iter: T) {
        for ch in iter {
            self.append(CodePoint::from(ch));
        }
    }
}

impl fmt::Write for TextChain {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_bytes(s.as_bytes());
        Ok(())
    }
}

impl fmt::Debug for TextChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextChain")
            .field("len", &self.len)
            .field("block_capacity", &self.block_capacity)
            .field("blocks", &self.blocks)
            .finish()
    }
}

/// Writes the content as UTF-8, substituting U+FFFD for malformed bytes.
impl fmt::Display for TextChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for decoded in self.chars() {
            let ch = decoded.as_char().unwrap_or(char::REPLACEMENT_CHARACTER);
            fmt::Write::write_char(f, ch)?;
        }
        Ok(())
    }
}
