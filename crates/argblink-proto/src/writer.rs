use std::io::{ErrorKind, Write};

use argblink_transport::{SerialLink, TransportError};
use bytes::{BufMut, BytesMut};

use crate::error::{ProtoError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Writes newline-terminated words to any `Write` stream.
///
/// Each word goes out in a single `write` call. The device consumes input
/// word by word, so a partially accepted word is a failed transmission and
/// is never resumed.
pub struct WordWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> WordWriter<T> {
    /// Create a new word writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Write `word` followed by `\n` (blocking).
    ///
    /// Fails with [`ProtoError::ShortWrite`] if the stream accepts fewer
    /// bytes than the encoded word.
    pub fn write_word(&mut self, word: &str) -> Result<()> {
        self.buf.clear();
        self.buf.reserve(word.len() + 1);
        self.buf.put_slice(word.as_bytes());
        self.buf.put_u8(b'\n');

        let expected = self.buf.len();
        let written = loop {
            match self.inner.write(&self.buf) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProtoError::Io(err)),
            }
        };

        if written < expected {
            return Err(ProtoError::ShortWrite { written, expected });
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProtoError::Io(err)),
            }
        }
    }
}

impl<L: SerialLink> WordWriter<L> {
    /// Close the underlying serial link.
    pub fn close(&mut self) -> Result<()> {
        self.inner.close().map_err(transport_to_proto_error)
    }
}

fn transport_to_proto_error(err: TransportError) -> ProtoError {
    ProtoError::Io(err.into())
}
