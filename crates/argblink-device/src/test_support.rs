//! In-memory serial link for device tests.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use argblink_transport::{LinkConfig, LinkReader, Result, SerialLink};

pub(crate) fn fast_config() -> LinkConfig {
    LinkConfig {
        word_delay: Duration::from_millis(1),
        ..LinkConfig::default()
    }
}

pub(crate) enum ReadStep {
    Data(&'static [u8]),
    Fail(ErrorKind),
    /// Block the reading thread before the next step.
    Pause(Duration),
}

#[derive(Default)]
struct WireState {
    steps: VecDeque<ReadStep>,
    written: Vec<String>,
    reader_close_attempted: bool,
    reader_closed: bool,
    link_closes: usize,
}

/// Observer side of a [`MockLink`]; stays usable after the link moves into a device.
#[derive(Clone, Default)]
pub(crate) struct Wire(Arc<Mutex<WireState>>);

impl Wire {
    pub(crate) fn feed(&self, data: &'static [u8]) {
        self.0.lock().unwrap().steps.push_back(ReadStep::Data(data));
    }

    pub(crate) fn pause(&self, duration: Duration) {
        self.0.lock().unwrap().steps.push_back(ReadStep::Pause(duration));
    }

    pub(crate) fn fail_next_read(&self, kind: ErrorKind) {
        self.0.lock().unwrap().steps.push_back(ReadStep::Fail(kind));
    }

    pub(crate) fn written(&self) -> Vec<String> {
        self.0.lock().unwrap().written.clone()
    }

    pub(crate) fn concatenated(&self) -> String {
        self.written().concat()
    }

    pub(crate) fn reader_close_attempted(&self) -> bool {
        self.0.lock().unwrap().reader_close_attempted
    }

    pub(crate) fn reader_closed(&self) -> bool {
        self.0.lock().unwrap().reader_closed
    }

    pub(crate) fn link_closed(&self) -> bool {
        self.link_close_count() > 0
    }

    pub(crate) fn link_close_count(&self) -> usize {
        self.0.lock().unwrap().link_closes
    }
}

pub(crate) struct MockLink {
    wire: Wire,
    short_by: usize,
    write_delay: Duration,
    fail_reader_close: bool,
}

impl MockLink {
    pub(crate) fn new(steps: Vec<ReadStep>) -> (Self, Wire) {
        let wire = Wire::default();
        wire.0.lock().unwrap().steps.extend(steps);
        let link = Self {
            wire: wire.clone(),
            short_by: 0,
            write_delay: Duration::ZERO,
            fail_reader_close: false,
        };
        (link, wire)
    }

    /// Accept `n` bytes fewer than requested on every write.
    pub(crate) fn short_by(mut self, n: usize) -> Self {
        self.short_by = n;
        self
    }

    /// Block every write for `delay`, like a port draining a full buffer.
    pub(crate) fn write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    pub(crate) fn failing_reader_close(mut self) -> Self {
        self.fail_reader_close = true;
        self
    }
}

impl Write for MockLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.write_delay.is_zero() {
            std::thread::sleep(self.write_delay);
        }
        let accepted = buf.len().saturating_sub(self.short_by);
        let text = String::from_utf8_lossy(&buf[..accepted]).into_owned();
        self.wire.0.lock().unwrap().written.push(text);
        Ok(accepted)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialLink for MockLink {
    type Reader = MockReader;

    fn name(&self) -> &str {
        "COM2"
    }

    fn description(&self) -> &str {
        "USB-SERIAL (COM2)"
    }

    fn try_clone_reader(&self) -> Result<MockReader> {
        Ok(MockReader {
            wire: self.wire.clone(),
            fail_close: self.fail_reader_close,
            closed: false,
        })
    }

    fn close(&mut self) -> Result<()> {
        self.wire.0.lock().unwrap().link_closes += 1;
        Ok(())
    }
}

/// Replays queued steps, then times out like an idle port.
pub(crate) struct MockReader {
    wire: Wire,
    fail_close: bool,
    closed: bool,
}

impl Read for MockReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::from(ErrorKind::NotConnected));
        }
        loop {
            let mut state = self.wire.0.lock().unwrap();
            let step = state.steps.pop_front();
            return match step {
                Some(ReadStep::Pause(duration)) => {
                    drop(state);
                    std::thread::sleep(duration);
                    continue;
                }
                Some(ReadStep::Data(data)) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    if n < data.len() {
                        state.steps.push_front(ReadStep::Data(&data[n..]));
                    }
                    Ok(n)
                }
                Some(ReadStep::Fail(kind)) => Err(io::Error::from(kind)),
                None => Err(io::Error::from(ErrorKind::TimedOut)),
            };
        }
    }
}

impl LinkReader for MockReader {
    fn close(&mut self) -> io::Result<()> {
        let mut state = self.wire.0.lock().unwrap();
        state.reader_close_attempted = true;
        if self.fail_close {
            return Err(io::Error::other("close failed"));
        }
        state.reader_closed = true;
        self.closed = true;
        Ok(())
    }
}
