use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};
use tracing::{debug, info};

use crate::config::LinkConfig;
use crate::error::{Result, TransportError};
use crate::traits::{LinkReader, SerialLink};

/// Serial link backed by an OS serial port.
///
/// The port is opened with the configured write timeout. Read handles
/// cloned from it use the (shorter) read timeout instead.
pub struct SerialPortLink {
    port: Option<Box<dyn SerialPort>>,
    name: String,
    description: String,
    read_timeout: Duration,
}

impl SerialPortLink {
    /// Open the serial port at `path` with the given configuration.
    pub fn open(path: &str, config: &LinkConfig) -> Result<Self> {
        let port = serialport::new(path, config.baud_rate)
            .timeout(config.write_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                port: path.to_string(),
                source,
            })?;

        let link = Self::from_port(port, path, config);
        info!(
            port = %link.description,
            baud = config.baud_rate,
            write_timeout = ?config.effective_write_timeout(),
            "serial connection open"
        );
        Ok(link)
    }

    /// Wrap an already opened port.
    pub fn from_port(port: Box<dyn SerialPort>, name: &str, config: &LinkConfig) -> Self {
        Self {
            port: Some(port),
            name: name.to_string(),
            description: describe_port(name),
            read_timeout: config.read_timeout,
        }
    }

    /// Whether the port is still open.
    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn port_mut(&mut self) -> std::io::Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or_else(not_connected)
    }
}

impl Write for SerialPortLink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port_mut()?.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port_mut()?.flush()
    }
}

impl SerialLink for SerialPortLink {
    type Reader = SerialPortReader;

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn try_clone_reader(&self) -> Result<SerialPortReader> {
        let port = self.port.as_ref().ok_or(TransportError::Closed)?;
        let mut reader = port
            .try_clone()
            .map_err(|err| TransportError::Io(err.into()))?;
        reader
            .set_timeout(self.read_timeout)
            .map_err(|err| TransportError::Io(err.into()))?;
        debug!(port = %self.name, timeout = ?self.read_timeout, "cloned read handle");
        #[cfg(windows)]
        debug!(
            port = %self.name,
            timeout = ?self.read_timeout,
            "read timeout now also applies to writes on this port"
        );
        Ok(SerialPortReader { port: Some(reader) })
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut port) = self.port.take() else {
            return Ok(());
        };
        let flushed = port.flush();
        drop(port);
        info!(port = %self.description, "serial connection closed");
        match flushed {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::TimedOut => Ok(()),
            Err(err) => Err(TransportError::Io(err)),
        }
    }
}

impl std::fmt::Debug for SerialPortLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortLink")
            .field("name", &self.name)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Read handle cloned from a [`SerialPortLink`].
pub struct SerialPortReader {
    port: Option<Box<dyn SerialPort>>,
}

impl Read for SerialPortReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.port.as_mut() {
            Some(port) => port.read(buf),
            None => Err(not_connected()),
        }
    }
}

impl LinkReader for SerialPortReader {
    fn close(&mut self) -> std::io::Result<()> {
        self.port.take();
        Ok(())
    }
}

fn not_connected() -> std::io::Error {
    std::io::Error::new(ErrorKind::NotConnected, "serial port closed")
}

/// Describe a port by its USB product name when the OS exposes one,
/// e.g. `USB-SERIAL (COM2)`. Falls back to the bare port name.
fn describe_port(name: &str) -> String {
    let product = serialport::available_ports()
        .ok()
        .and_then(|ports| ports.into_iter().find(|info| info.port_name == name))
        .and_then(|info| match info.port_type {
            SerialPortType::UsbPort(usb) => usb.product,
            _ => None,
        });

    match product {
        Some(product) => format!("{product} ({name})"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_port_fails() {
        let result = SerialPortLink::open("/dev/argblink-missing-port", &LinkConfig::default());
        match result {
            Err(TransportError::Open { port, .. }) => {
                assert_eq!(port, "/dev/argblink-missing-port");
            }
            other => panic!("expected open failure, got {other:?}"),
        }
    }

    #[test]
    fn unknown_port_described_by_name() {
        assert_eq!(
            describe_port("/dev/argblink-missing-port"),
            "/dev/argblink-missing-port"
        );
    }

    #[test]
    fn closed_reader_reports_not_connected() {
        let mut reader = SerialPortReader { port: None };
        let mut buf = [0u8; 4];
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotConnected);
        assert!(reader.close().is_ok());
    }

    #[test]
    fn closed_error_converts_to_not_connected() {
        let err: std::io::Error = TransportError::Closed.into();
        assert_eq!(err.kind(), ErrorKind::NotConnected);
    }
}
