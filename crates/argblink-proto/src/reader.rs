use std::io::{ErrorKind, Read};

use argblink_transport::{LinkConfig, DEFAULT_MAX_LINE_LENGTH};
use bytes::BytesMut;
use tracing::warn;

use crate::error::{ProtoError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 256;

/// Reads `\n`-terminated lines from any `Read` stream.
///
/// Built for serial ports with a short read timeout: a timeout is not an
/// error, it just means no complete line is available yet. Bytes of a
/// partially received line are kept until the rest arrives.
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    max_line_length: usize,
    discarding: bool,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader with the default maximum line length.
    pub fn new(inner: T) -> Self {
        Self::with_max_line_length(inner, DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a line reader using the limits from a link configuration.
    pub fn with_config(inner: T, config: &LinkConfig) -> Self {
        Self::with_max_line_length(inner, config.max_line_length)
    }

    /// Create a line reader with an explicit maximum line length.
    pub fn with_max_line_length(inner: T, max_line_length: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            max_line_length,
            discarding: false,
        }
    }

    /// Read the next complete line (blocking).
    ///
    /// The terminator and a trailing `\r` are stripped. Returns `Ok(None)`
    /// when the read times out or the stream has ended; at end of stream a
    /// pending unterminated line is returned first.
    ///
    /// A line longer than the maximum fails with [`ProtoError::LineTooLong`].
    /// The reader stays usable: the rest of that line is dropped and the
    /// next call resumes after its terminator.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut scanned = 0usize;
        loop {
            if let Some(pos) = self.buf[scanned..].iter().position(|&b| b == b'\n') {
                let len = scanned + pos;
                let line = self.buf.split_to(len + 1);
                if self.discarding {
                    self.discarding = false;
                    scanned = 0;
                    continue;
                }
                if len > self.max_line_length {
                    warn!(len, max = self.max_line_length, "discarding oversized line");
                    return Err(ProtoError::LineTooLong {
                        len,
                        max: self.max_line_length,
                    });
                }
                return Ok(Some(decode_line(&line)));
            }

            if self.discarding {
                self.buf.clear();
                scanned = 0;
            } else if self.buf.len() > self.max_line_length {
                let len = self.buf.len();
                self.buf.clear();
                self.discarding = true;
                warn!(len, max = self.max_line_length, "discarding unterminated line");
                return Err(ProtoError::LineTooLong {
                    len,
                    max: self.max_line_length,
                });
            } else {
                scanned = self.buf.len();
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => return Ok(None),
                Err(err) => return Err(ProtoError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let rest = self.buf.split();
                return Ok(Some(decode_line(&rest)));
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Number of bytes received but not yet returned as a line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;

    use super::*;

    #[test]
    fn read_single_line() {
        let mut reader = LineReader::new(Cursor::new(b"INIT\r\n".to_vec()));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("INIT"));
        assert_eq!(reader.read_line().unwrap(), None);
    }

    #[test]
    fn read_multiple_lines() {
        let wire = b"INIT\nDATA leds 1 2\r\nDONE\n".to_vec();
        let mut reader = LineReader::new(Cursor::new(wire));

        assert_eq!(reader.read_line().unwrap().as_deref(), Some("INIT"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("DATA leds 1 2"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("DONE"));
        assert_eq!(reader.read_line().unwrap(), None);
    }

    #[test]
    fn empty_line_is_a_line() {
        let mut reader = LineReader::new(Cursor::new(b"\r\nDONE\n".to_vec()));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some(""));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("DONE"));
    }

    #[test]
    fn unterminated_line_returned_at_eof() {
        let mut reader = LineReader::new(Cursor::new(b"DONE".to_vec()));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("DONE"));
        assert_eq!(reader.read_line().unwrap(), None);
    }

    #[test]
    fn partial_line_survives_timeout() {
        let script = ScriptedReader::new(vec![
            Step::Data(b"DATA le"),
            Step::Fail(ErrorKind::TimedOut),
            Step::Data(b"ds 5\n"),
        ]);
        let mut reader = LineReader::new(script);

        assert_eq!(reader.read_line().unwrap(), None);
        assert_eq!(reader.pending(), 7);
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("DATA leds 5"));
        assert_eq!(reader.pending(), 0);
    }

    #[test]
    fn would_block_is_treated_as_timeout() {
        let script = ScriptedReader::new(vec![Step::Fail(ErrorKind::WouldBlock)]);
        let mut reader = LineReader::new(script);
        assert_eq!(reader.read_line().unwrap(), None);
    }

    #[test]
    fn interrupted_read_retries() {
        let script = ScriptedReader::new(vec![
            Step::Fail(ErrorKind::Interrupted),
            Step::Data(b"INIT\n"),
        ]);
        let mut reader = LineReader::new(script);
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("INIT"));
    }

    #[test]
    fn other_errors_propagate() {
        let script = ScriptedReader::new(vec![Step::Fail(ErrorKind::BrokenPipe)]);
        let mut reader = LineReader::new(script);
        let err = reader.read_line().unwrap_err();
        assert!(matches!(err, ProtoError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn byte_by_byte_delivery() {
        let script = ScriptedReader::new(b"SET x 1\n".iter().map(|b| Step::Byte(*b)).collect());
        let mut reader = LineReader::new(script);
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("SET x 1"));
    }

    #[test]
    fn overlong_line_rejected() {
        let wire = vec![b'x'; 64];
        let mut reader = LineReader::with_max_line_length(Cursor::new(wire), 16);
        let err = reader.read_line().unwrap_err();
        assert!(matches!(err, ProtoError::LineTooLong { max: 16, .. }));
        assert_eq!(reader.pending(), 0);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut reader = LineReader::new(Cursor::new(b"ERR \xff\n".to_vec()));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("ERR \u{fffd}"));
    }

    #[test]
    fn config_sets_line_limit() {
        let cfg = LinkConfig {
            max_line_length: 4,
            ..LinkConfig::default()
        };
        let mut reader = LineReader::with_config(Cursor::new(b"DATA leds\n".to_vec()), &cfg);
        assert!(matches!(
            reader.read_line(),
            Err(ProtoError::LineTooLong { max: 4, .. })
        ));
    }

    #[test]
    fn reader_recovers_after_overlong_line() {
        let mut wire = vec![b'x'; 64];
        wire.extend_from_slice(b"\nINIT\n");
        let mut reader = LineReader::with_max_line_length(Cursor::new(wire), 16);

        assert!(matches!(
            reader.read_line(),
            Err(ProtoError::LineTooLong { len: 64, max: 16 })
        ));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("INIT"));
    }

    #[test]
    fn unterminated_noise_is_skipped_through_next_newline() {
        let script = ScriptedReader::new(vec![
            Step::Data(b"xxxxxxxxxxxxxxxxxxxx"),
            Step::Data(b"xxxxxxxx"),
            Step::Fail(ErrorKind::TimedOut),
            Step::Data(b"xxxx\nINIT\n"),
        ]);
        let mut reader = LineReader::with_max_line_length(script, 16);

        assert!(matches!(
            reader.read_line(),
            Err(ProtoError::LineTooLong { len: 20, max: 16 })
        ));
        assert_eq!(reader.read_line().unwrap(), None);
        assert_eq!(reader.pending(), 0);
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("INIT"));
        assert_eq!(reader.read_line().unwrap(), None);
    }

    enum Step {
        Data(&'static [u8]),
        Byte(u8),
        Fail(ErrorKind),
    }

    struct ScriptedReader {
        steps: VecDeque<Step>,
    }

    impl ScriptedReader {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: steps.into(),
            }
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.steps.pop_front() {
                None => Ok(0),
                Some(Step::Data(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(bytes);
                    Ok(bytes.len())
                }
                Some(Step::Byte(byte)) => {
                    buf[0] = byte;
                    Ok(1)
                }
                Some(Step::Fail(kind)) => Err(std::io::Error::from(kind)),
            }
        }
    }
}
