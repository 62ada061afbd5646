//! Byte sources feeding a [`StreamParser`](crate::StreamParser).
//!
//! The parser pulls bytes in whole blocks through [`ByteSource::read`]. A read
//! that returns fewer bytes than requested tells the parser the source is
//! exhausted; it will not be asked again.
//!
//! Sources are passed by value, so to keep ownership of one (for example to
//! close a file afterwards) hand the parser a `&mut` to it.

use alloc::vec::Vec;

/// A pull-based supplier of bytes.
pub trait ByteSource {
    /// Fills as much of `buf` as possible and returns the number of bytes
    /// written. Anything less than `buf.len()` signals end of stream.
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        (**self).read(buf)
    }
}

impl ByteSource for &[u8] {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        n
    }
}

/// An owned in-memory source.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
    pos: usize,
}

impl MemorySource {
    /// Creates a source over `data`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    /// The bytes not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.pos..]
    }
}

impl ByteSource for MemorySource {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut rest = self.remaining();
        let n = rest.read(buf);
        self.pos += n;
        n
    }
}

#[cfg(feature = "std")]
pub use self::io::ReadSource;

#[cfg(feature = "std")]
mod io {
    use std::io::{ErrorKind, Read};

    use super::ByteSource;

    /// Adapts any [`std::io::Read`] into a [`ByteSource`].
    ///
    /// Each block read loops until the block is full or the reader returns 0,
    /// so a reader that hands out data in small pieces (pipes, sockets) is not
    /// mistaken for an exhausted one. `Interrupted` is retried; any other
    /// error ends the stream and is kept for [`ReadSource::take_error`].
    #[derive(Debug)]
    pub struct ReadSource<R> {
        reader: R,
        error: Option<std::io::Error>,
    }

    impl<R: Read> ReadSource<R> {
        /// Wraps `reader`.
        pub fn new(reader: R) -> Self {
            Self {
                reader,
                error: None,
            }
        }

        /// Returns the I/O error that ended the stream, if any.
        pub fn take_error(&mut self) -> Option<std::io::Error> {
            self.error.take()
        }

        /// Borrows the underlying reader.
        pub fn get_ref(&self) -> &R {
            &self.reader
        }

        /// Unwraps the underlying reader.
        pub fn into_inner(self) -> R {
            self.reader
        }
    }

    impl<R: Read> ByteSource for ReadSource<R> {
        fn read(&mut self, buf: &mut [u8]) -> usize {
            let mut filled = 0;
            while filled < buf.len() {
                match self.reader.read(&mut buf[filled..]) {
                    Ok(0) => break,
                    Ok(n) => filled += n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(e) => {
                        tracing::warn!(error = %e, filled, "read failed, ending stream");
                        self.error = Some(e);
                        break;
                    }
                }
            }
            filled
        }
    }
}
