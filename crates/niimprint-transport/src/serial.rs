use std::io::{Read, Write};
use std::time::Duration;

use tracing::{debug, info};

use crate::discovery::{select_port, DeviceFilter, PortCandidate};
use crate::error::{Result, TransportError};

/// Line rate used by every supported model.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Reads give up after this long so callers can poll without hanging.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Serial port settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub read_timeout: Duration,
    pub filter: DeviceFilter,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            filter: DeviceFilter::platform_default(),
        }
    }
}

impl SerialConfig {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_filter(mut self, filter: DeviceFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Enumerate the system's serial ports.
///
/// Built without `libudev`, Linux enumeration goes through sysfs and may
/// report less USB metadata.
pub fn available_ports() -> Result<Vec<PortCandidate>> {
    let ports = serialport::available_ports()
        .map_err(|e| TransportError::Enumerate(std::io::Error::from(e)))?;

    Ok(ports
        .into_iter()
        .map(|port| match port.port_type {
            serialport::SerialPortType::UsbPort(usb) => PortCandidate {
                port_name: port.port_name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                manufacturer: usb.manufacturer,
            },
            _ => PortCandidate::named(port.port_name),
        })
        .collect())
}

/// An open printer port.
///
/// Implements `Read + Write`; reads time out after the configured read
/// timeout, which surfaces as `ErrorKind::TimedOut`.
pub struct SerialTransport {
    port: Option<Box<dyn serialport::SerialPort>>,
    port_name: String,
}

impl SerialTransport {
    /// Open the printer at `address`, or the first auto-detected one.
    pub fn open(address: Option<&str>) -> Result<Self> {
        Self::open_with_config(address, &SerialConfig::default())
    }

    /// Open with explicit settings.
    pub fn open_with_config(address: Option<&str>, config: &SerialConfig) -> Result<Self> {
        let candidates = available_ports()?;
        debug!(count = candidates.len(), "enumerated serial ports");
        let selected = select_port(&candidates, address, &config.filter)?;

        let port = serialport::new(selected.port_name.as_str(), config.baud_rate)
            .timeout(config.read_timeout)
            .open()
            .map_err(|e| TransportError::Open {
                path: selected.port_name.clone(),
                source: std::io::Error::from(e),
            })?;

        info!(port = %selected.port_name, baud = config.baud_rate, "opened printer port");
        Ok(Self {
            port: Some(port),
            port_name: selected.port_name,
        })
    }

    /// Name of the underlying port, e.g. `/dev/ttyACM0` or `COM3`.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Release the port. Calling this more than once is harmless.
    pub fn close(&mut self) {
        if self.port.take().is_some() {
            info!(port = %self.port_name, "closed printer port");
        }
    }

    fn port_mut(&mut self) -> std::io::Result<&mut Box<dyn serialport::SerialPort>> {
        self.port.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, TransportError::Closed)
        })
    }
}

impl Read for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port_mut()?.read(buf)
    }
}

impl Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port_mut()?.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port_mut()?.flush()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port_name", &self.port_name)
            .field("open", &self.is_open())
            .finish()
    }
}
