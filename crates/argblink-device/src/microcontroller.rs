use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use argblink_proto::{Command, LineReader, Message, ProtoError, WordWriter};
use argblink_transport::{LinkConfig, LinkReader, SerialLink, SerialPortLink};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::error::{DeviceError, Result};
use crate::pull_loop::PullLoop;

/// A microcontroller connected over a serial link.
///
/// The read side and the write side of the link are independent: a pull
/// can be waiting for a line while a command is being sent. Concurrent
/// [`send_command`](Self::send_command) calls are serialized, so the words
/// of two commands never interleave on the wire.
pub struct Microcontroller<L: SerialLink> {
    name: String,
    description: String,
    config: LinkConfig,
    writer: Arc<Mutex<WordWriter<L>>>,
    reader: Arc<Mutex<Option<LineReader<L::Reader>>>>,
    send_lock: tokio::sync::Mutex<()>,
    messages: watch::Sender<Message>,
    disposed: AtomicBool,
}

impl Microcontroller<SerialPortLink> {
    /// Open the serial port at `path` and bind a microcontroller to it.
    pub fn open(path: &str, config: LinkConfig) -> Result<Self> {
        let link = SerialPortLink::open(path, &config)?;
        Self::from_link(link, config)
    }
}

impl<L: SerialLink> Microcontroller<L> {
    /// Bind a microcontroller to an already open link.
    pub fn from_link(link: L, config: LinkConfig) -> Result<Self> {
        let reader = LineReader::with_config(link.try_clone_reader()?, &config);
        let (messages, _) = watch::channel(Message::Null);

        let device = Self {
            name: link.name().to_string(),
            description: link.description().to_string(),
            config,
            writer: Arc::new(Mutex::new(WordWriter::new(link))),
            reader: Arc::new(Mutex::new(Some(reader))),
            send_lock: tokio::sync::Mutex::new(()),
            messages,
            disposed: AtomicBool::new(false),
        };
        info!(
            port = %device.description,
            baud = device.config.baud_rate,
            "microcontroller connected"
        );
        Ok(device)
    }

    /// System name of the serial port.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Link configuration in use.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Subscribe to decoded messages.
    ///
    /// The receiver starts at the latest published message ([`Message::Null`]
    /// before anything has been received). Only the latest value is kept: a
    /// slow observer sees the most recent message, not every message.
    pub fn subscribe(&self) -> watch::Receiver<Message> {
        self.messages.subscribe()
    }

    /// The most recently published message.
    pub fn latest(&self) -> Message {
        self.messages.borrow().clone()
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Pull messages from the microcontroller.
    ///
    /// Reads lines until a read yields nothing (the read timeout elapsed or
    /// the port reached end of stream), publishing each decoded message to
    /// subscribers. Returns the number of messages published.
    ///
    /// A line longer than the configured maximum is logged and skipped;
    /// reading continues after it.
    ///
    /// Meant to be called in a loop, at intervals well under a second; see
    /// [`spawn_pull_loop`](Self::spawn_pull_loop).
    pub async fn pull_messages(&self) -> Result<usize> {
        self.pull_until(None).await
    }

    /// [`pull_messages`](Self::pull_messages) that also returns, between
    /// lines, once `stop` is cancelled. A line already being read is
    /// published first.
    pub(crate) async fn pull_until(&self, stop: Option<&CancellationToken>) -> Result<usize> {
        let mut published = 0usize;
        loop {
            self.ensure_open()?;
            if stop.is_some_and(CancellationToken::is_cancelled) {
                return Ok(published);
            }
            let Some(line) = self.read_line().await? else {
                return Ok(published);
            };
            debug!(port = %self.name, "--> {line}");
            self.messages.send_replace(Message::parse(&line));
            published += 1;
        }
    }

    async fn read_line(&self) -> Result<Option<String>> {
        let reader = Arc::clone(&self.reader);
        tokio::task::spawn_blocking(move || {
            let mut reader = reader.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(reader) = reader.as_mut() else {
                return Err(DeviceError::Disposed);
            };
            loop {
                match reader.read_line() {
                    Err(ProtoError::LineTooLong { .. }) => continue,
                    read => return read.map_err(DeviceError::from),
                }
            }
        })
        .await?
    }

    /// Send a command to the microcontroller.
    ///
    /// Each envelope word is written with a line terminator, followed by the
    /// configured word delay. If the port accepts fewer bytes than a word
    /// needs, the command is aborted with [`ProtoError::ShortWrite`] and the
    /// remaining words are not sent.
    pub async fn send_command(&self, command: &Command) -> Result<()> {
        let _sending = self.send_lock.lock().await;
        self.ensure_open()?;
        debug!(port = %self.name, "<-- {command}");

        for word in command.words() {
            trace!(port = %self.name, "<-- {word}");
            let writer = Arc::clone(&self.writer);
            let written = tokio::task::spawn_blocking(move || {
                writer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .write_word(&word)
            })
            .await?;

            if let Err(err) = written {
                if let ProtoError::ShortWrite { written, expected } = &err {
                    error!(port = %self.name, "<!-- error: {written}/{expected} bytes sent");
                }
                return Err(err.into());
            }

            tokio::time::sleep(self.config.word_delay).await;
        }
        Ok(())
    }

    /// Run [`pull_messages`](Self::pull_messages) on a background task.
    ///
    /// The task pauses `interval` between pulls and stops when the returned
    /// handle is shut down or a pull fails.
    pub fn spawn_pull_loop(self: &Arc<Self>, interval: Duration) -> PullLoop {
        PullLoop::spawn(Arc::clone(self), interval)
    }

    /// Close the read side, then the connection.
    ///
    /// A failure to close the read side is logged and otherwise ignored;
    /// the connection is closed regardless. Later calls do nothing.
    ///
    /// Blocks the calling thread until an in-flight read or word write
    /// finishes, which takes up to the read or write timeout. From async
    /// code prefer [`close`](Self::close).
    pub fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        release(&self.reader, &self.writer, &self.name, &self.description)
    }

    /// [`dispose`](Self::dispose) without blocking the async worker: the
    /// wait for in-flight I/O runs on the blocking pool.
    pub async fn close(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let reader = Arc::clone(&self.reader);
        let writer = Arc::clone(&self.writer);
        let name = self.name.clone();
        let description = self.description.clone();
        tokio::task::spawn_blocking(move || release(&reader, &writer, &name, &description)).await?
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(DeviceError::Disposed);
        }
        Ok(())
    }
}

fn release<L: SerialLink>(
    reader: &Mutex<Option<LineReader<L::Reader>>>,
    writer: &Mutex<WordWriter<L>>,
    name: &str,
    description: &str,
) -> Result<()> {
    let reader = reader.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(mut reader) = reader {
        if let Err(err) = reader.get_mut().close() {
            error!(port = %name, error = %err, "error closing serial port reader");
        }
    }

    let closed = writer.lock().unwrap_or_else(PoisonError::into_inner).close();
    info!(port = %description, "microcontroller disconnected");
    closed.map_err(DeviceError::from)
}

impl<L: SerialLink> fmt::Display for Microcontroller<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl<L: SerialLink> fmt::Debug for Microcontroller<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Microcontroller")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
