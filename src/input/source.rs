// Polled human input device
//
// Binds to the first device the backend reports and turns its current state
// into immutable snapshots. Nothing is buffered between polls.

use std::fmt;

use tracing::{info, warn};

use super::gamepad::GilrsBackend;
use crate::messages::InputSnapshot;

/// Error types for the input source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Input source is not connected")]
    NotConnected,

    #[error("No input device present")]
    NoDevice,

    #[error("Input device was disconnected")]
    DeviceLost,

    #[error("Input backend error: {0}")]
    Backend(String),
}

/// Access to the OS input devices
pub trait InputBackend {
    type Device: Copy + Eq + fmt::Debug;

    /// Devices currently present, in enumeration order
    fn devices(&mut self) -> Vec<Self::Device>;

    /// Instantaneous state of `device`, `None` if it is no longer present
    fn sample(&mut self, device: Self::Device) -> Option<InputSnapshot>;
}

pub struct InputSource<I: InputBackend = GilrsBackend> {
    backend: I,
    device: Option<I::Device>,
}

impl InputSource<GilrsBackend> {
    /// Input source over the system gamepads
    pub fn new() -> Result<Self, InputError> {
        Ok(Self::with_backend(GilrsBackend::new()?))
    }
}

impl<I: InputBackend> InputSource<I> {
    pub fn with_backend(backend: I) -> Self {
        Self {
            backend,
            device: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    /// Bind to the first present device, returning whether one was found
    pub fn connect(&mut self) -> bool {
        self.try_connect().is_ok()
    }

    pub fn try_connect(&mut self) -> Result<(), InputError> {
        if self.device.is_some() {
            return Ok(());
        }

        let device = *self
            .backend
            .devices()
            .first()
            .ok_or(InputError::NoDevice)?;

        self.device = Some(device);
        // Priming read
        if let Err(e) = self.read_values() {
            warn!("Input device {:?} failed its first read: {}", device, e);
            return Err(e);
        }

        info!("Input device {:?} connected", device);
        Ok(())
    }

    /// Snapshot of the bound device's axes, buttons and hat.
    ///
    /// Fails with `NotConnected` if no device is bound. A device that has
    /// vanished is unbound and reported as `DeviceLost`.
    pub fn read_values(&mut self) -> Result<InputSnapshot, InputError> {
        let device = self.device.ok_or(InputError::NotConnected)?;
        match self.backend.sample(device) {
            Some(snapshot) => Ok(snapshot),
            None => {
                warn!("Input device {:?} lost", device);
                self.device = None;
                Err(InputError::DeviceLost)
            }
        }
    }

    /// Release the device binding. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        if let Some(device) = self.device.take() {
            info!("Input device {:?} released", device);
        }
    }
}
