// Serial link to the remote motor controller
//
// Owns at most one open session. Every failure leaves the link either fully
// connected or fully disconnected; retry policy belongs to the caller.

use std::io::{self, Write};

use tracing::{debug, info, warn};

use super::protocol::encode_frame;
use super::serial::{
    DeviceDescriptor, LinkError, Result, SerialBackend, SerialHandle, SystemSerial, discover_port,
};
use crate::config::LinkConfig;
use crate::messages::MotorCommand;

/// Connection to the motor controller
pub struct MotorLink<B: SerialBackend = SystemSerial> {
    backend: B,
    config: LinkConfig,
    connection: Option<Connection>,
}

struct Connection {
    port: String,
    handle: Box<dyn SerialHandle>,
}

impl MotorLink<SystemSerial> {
    /// Link using the OS serial ports
    pub fn new(config: LinkConfig) -> Self {
        Self::with_backend(SystemSerial, config)
    }
}

impl<B: SerialBackend> MotorLink<B> {
    pub fn with_backend(backend: B, config: LinkConfig) -> Self {
        Self {
            backend,
            config,
            connection: None,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Port of the current session, if any
    pub fn port(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.port.as_str())
    }

    /// True iff a session is held and the device behind it is still there
    pub fn is_connected(&self) -> bool {
        self.connection.as_ref().is_some_and(|c| c.handle.is_alive())
    }

    /// Attempt to connect, returning whether the link is now up.
    ///
    /// Absent devices and open failures are logged and reported as `false`.
    /// Already being connected to a live session is a no-op.
    pub fn connect(&mut self) -> bool {
        match self.try_connect() {
            Ok(()) => true,
            Err(e @ LinkError::DeviceAbsent { .. }) => {
                debug!("{}", e);
                false
            }
            Err(e) => {
                warn!("Motor link connect failed: {}", e);
                false
            }
        }
    }

    /// Like [`connect`](Self::connect) but reports why it failed
    pub fn try_connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        if let Some(stale) = self.connection.take() {
            warn!("Dropping dead session on {}", stale.port);
        }

        let port = match &self.config.port {
            Some(port) => port.clone(),
            None => discover_port(&self.backend, &self.config.device_match)?,
        };

        let device = DeviceDescriptor {
            port,
            baud_rate: self.config.baud_rate,
            write_timeout: self.config.write_timeout(),
        };
        let handle = self.backend.open(&device)?;

        info!(
            "Motor link connected on {} at {} baud",
            device.port, device.baud_rate
        );
        self.connection = Some(Connection {
            port: device.port,
            handle,
        });
        Ok(())
    }

    /// Send one command frame, or the neutral command when `command` is `None`.
    ///
    /// Any write failure drops the session; the caller reconnects before the
    /// next write.
    pub fn write_speeds(&mut self, command: Option<MotorCommand>) -> Result<()> {
        let command = command.unwrap_or(MotorCommand::NEUTRAL);
        let frame = encode_frame(&command);

        let connection = self.connection.as_mut().ok_or(LinkError::NotConnected)?;
        debug!("Writing frame {:?}", frame.trim_end());

        // No flush: draining the OS buffer is not bounded by the port timeout
        match connection.handle.write_all(frame.as_bytes()) {
            Ok(()) => Ok(()),
            Err(e) => {
                let port = connection.port.clone();
                self.connection = None;
                let err = if e.kind() == io::ErrorKind::TimedOut {
                    LinkError::WriteTimeout {
                        timeout: self.config.write_timeout(),
                    }
                } else {
                    LinkError::Transmit(e)
                };
                warn!("Motor link on {} lost: {}", port, err);
                Err(err)
            }
        }
    }

    /// Close the session if one is open. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            info!("Motor link on {} closed", connection.port);
        }
    }
}

impl<B: SerialBackend> Drop for MotorLink<B> {
    fn drop(&mut self) {
        // Leave the vehicle in neutral before releasing the port
        if self.is_connected() {
            if let Err(e) = self.write_speeds(None) {
                warn!("Failed to send neutral on drop: {}", e);
            }
        }
        self.disconnect();
    }
}
