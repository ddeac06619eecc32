use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::thread;

use niimprint_frame::codes::{code_name, is_error_code, UNIMPLEMENTED};
use niimprint_frame::{Packet, PacketStream};
use tracing::{debug, warn};

use crate::command::{Command, CommandDescriptor};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};

/// A command session over one printer link.
///
/// At most one command is in flight at a time. A second caller racing an
/// in-flight command gets [`SessionError::Busy`] instead of waiting, so
/// responses can never be handed to the wrong request.
pub struct Session<T> {
    stream: Mutex<Option<PacketStream<T>>>,
    closed: AtomicBool,
    config: SessionConfig,
}

impl<T: Read + Write + Send> Session<T> {
    /// Wrap an open transport with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Wrap an open transport with explicit configuration.
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        let mut stream = PacketStream::with_policy(transport, config.resync);
        stream.set_read_chunk_size(config.read_chunk_size);
        Self {
            stream: Mutex::new(Some(stream)),
            closed: AtomicBool::new(false),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    /// Issue a command from the command table and wait for its response.
    pub fn request(&self, command: Command, payload: &[u8]) -> Result<Packet> {
        self.send(&command.descriptor(), payload)
    }

    /// Send `payload` under `descriptor` and wait for the matching response.
    ///
    /// Packets that arrive in the meantime with other codes are discarded.
    /// A value-error or unimplemented packet fails the command immediately.
    pub fn send(&self, descriptor: &CommandDescriptor, payload: &[u8]) -> Result<Packet> {
        let expected = descriptor.expected_response().ok_or_else(|| {
            SessionError::InvalidArgument(format!(
                "{} has no response; use send_raw",
                descriptor.name
            ))
        })?;

        let mut guard = self.acquire()?;
        let stream = self.open_stream(&mut guard)?;

        debug!(
            command = descriptor.name,
            code = descriptor.request_code,
            expected,
            "sending command"
        );
        stream.write_packet(descriptor.request_code, payload)?;
        self.await_response(stream, descriptor.name, expected)
    }

    /// Write one packet without waiting for any response.
    pub fn send_raw(&self, code: u8, payload: &[u8]) -> Result<()> {
        let mut guard = self.acquire()?;
        let stream = self.open_stream(&mut guard)?;
        stream.write_packet(code, payload)?;
        Ok(())
    }

    /// Write a run of packets under one lock, so no other command interleaves.
    pub(crate) fn send_raw_all<I>(&self, code: u8, payloads: I) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut guard = self.acquire()?;
        let stream = self.open_stream(&mut guard)?;

        let mut sent = 0;
        for payload in payloads {
            if self.closed.load(Ordering::Acquire) {
                return Err(SessionError::TransportClosed);
            }
            stream.write_packet(code, payload.as_ref())?;
            sent += 1;
        }
        Ok(sent)
    }

    /// Close the session and release the transport.
    ///
    /// Idempotent. A command waiting for a response fails with
    /// [`SessionError::TransportClosed`] at its next poll; this call returns
    /// once that command has let go of the transport.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut guard = self
            .stream
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        drop(guard.take());
        debug!("session closed");
    }

    fn acquire(&self) -> Result<MutexGuard<'_, Option<PacketStream<T>>>> {
        match self.stream.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::WouldBlock) => Err(SessionError::Busy),
            // A panic mid-command leaves at worst a partial frame buffered.
            Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
        }
    }

    fn open_stream<'g>(
        &self,
        guard: &'g mut MutexGuard<'_, Option<PacketStream<T>>>,
    ) -> Result<&'g mut PacketStream<T>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SessionError::TransportClosed);
        }
        guard.as_mut().ok_or(SessionError::TransportClosed)
    }

    fn await_response(
        &self,
        stream: &mut PacketStream<T>,
        command: &'static str,
        expected: u8,
    ) -> Result<Packet> {
        let attempts = self.config.response_attempts.max(1);

        for attempt in 0..attempts {
            if attempt > 0 {
                thread::sleep(self.config.response_interval);
            }
            if self.closed.load(Ordering::Acquire) {
                return Err(SessionError::TransportClosed);
            }

            for packet in stream.poll()? {
                match packet.packet_type() {
                    UNIMPLEMENTED => return Err(SessionError::UnsupportedCommand { command }),
                    code if is_error_code(code) => {
                        return Err(SessionError::DeviceRejected {
                            command,
                            response: code,
                        })
                    }
                    code if code == expected => {
                        debug!(command, code, len = packet.data().len(), "received response");
                        return Ok(packet);
                    }
                    code => warn!(
                        command,
                        expected,
                        received = code,
                        received_name = code_name(code),
                        "discarding packet with unexpected response code"
                    ),
                }
            }
        }

        Err(SessionError::ResponseTimeout {
            command,
            expected,
            attempts,
        })
    }
}

#[cfg(feature = "serial")]
impl Session<niimprint_transport::SerialTransport> {
    /// Open the printer at `address`, or the first auto-detected one.
    pub fn open(address: Option<&str>) -> Result<Self> {
        let transport = niimprint_transport::SerialTransport::open(address)?;
        Ok(Self::new(transport))
    }

    /// Open with explicit port and session settings.
    pub fn open_with_config(
        address: Option<&str>,
        serial: &niimprint_transport::SerialConfig,
        config: SessionConfig,
    ) -> Result<Self> {
        let transport = niimprint_transport::SerialTransport::open_with_config(address, serial)?;
        Ok(Self::with_config(transport, config))
    }
}

impl<T> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("open", &!self.closed.load(Ordering::Acquire))
            .field("config", &self.config)
            .finish()
    }
}
