// In-memory serial and gamepad backends for driving the bridge without hardware
#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use rov_teleop_bridge::input::InputBackend;
use rov_teleop_bridge::messages::{Hat, InputSnapshot};
use rov_teleop_bridge::motor::{DeviceDescriptor, LinkError, PortInfo, SerialBackend, SerialHandle};

#[derive(Default)]
struct WireState {
    present: bool,
    generation: u64,
    written: Vec<u8>,
    fail: Option<io::ErrorKind>,
    opened: Vec<DeviceDescriptor>,
}

/// Shared view of everything the fake serial device has seen
#[derive(Clone, Default)]
pub struct FakeWire(Arc<Mutex<WireState>>);

impl FakeWire {
    fn state(&self) -> MutexGuard<'_, WireState> {
        self.0.lock().unwrap()
    }

    pub fn written(&self) -> String {
        String::from_utf8(self.state().written.clone()).unwrap()
    }

    pub fn frames(&self) -> Vec<String> {
        self.written().lines().map(str::to_string).collect()
    }

    pub fn opened(&self) -> Vec<DeviceDescriptor> {
        self.state().opened.clone()
    }

    pub fn fail_writes(&self, kind: io::ErrorKind) {
        self.state().fail = Some(kind);
    }

    pub fn heal_writes(&self) {
        self.state().fail = None;
    }

    /// Device disappears; existing handles die for good
    pub fn unplug(&self) {
        let mut state = self.state();
        state.present = false;
        state.generation += 1;
    }

    pub fn replug(&self) {
        self.state().present = true;
    }
}

pub struct FakeSerial {
    ports: Vec<PortInfo>,
    wire: FakeWire,
}

impl FakeSerial {
    pub fn with_ports(ports: Vec<PortInfo>) -> Self {
        let wire = FakeWire::default();
        wire.replug();
        Self { ports, wire }
    }

    /// One Arduino behind a plain PCI port
    pub fn arduino() -> Self {
        Self::with_ports(vec![
            PortInfo::new("/dev/ttyS0", "PCI"),
            PortInfo::new("/dev/ttyACM0", "Arduino Uno"),
        ])
    }

    pub fn wire(&self) -> FakeWire {
        self.wire.clone()
    }
}

impl SerialBackend for FakeSerial {
    fn list_ports(&self) -> Result<Vec<PortInfo>, LinkError> {
        Ok(self.ports.clone())
    }

    fn open(&self, device: &DeviceDescriptor) -> Result<Box<dyn SerialHandle>, LinkError> {
        let mut state = self.wire.state();
        let known = self.ports.iter().any(|p| p.name == device.port);
        if !known || !state.present {
            return Err(LinkError::Open {
                port: device.port.clone(),
                source: serialport::Error::new(serialport::ErrorKind::NoDevice, "no such device"),
            });
        }

        state.opened.push(device.clone());
        Ok(Box::new(FakeHandle {
            wire: self.wire.clone(),
            generation: state.generation,
        }))
    }
}

struct FakeHandle {
    wire: FakeWire,
    generation: u64,
}

impl Write for FakeHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.is_alive() {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        let mut state = self.wire.state();
        if let Some(kind) = state.fail {
            return Err(io::Error::from(kind));
        }
        state.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialHandle for FakeHandle {
    fn is_alive(&self) -> bool {
        let state = self.wire.state();
        state.present && state.generation == self.generation
    }
}

/// Gamepads indexed by position; `None` entries are unplugged
#[derive(Clone, Default)]
pub struct FakePads(Arc<Mutex<Vec<Option<InputSnapshot>>>>);

impl FakePads {
    pub fn with(pads: Vec<Option<InputSnapshot>>) -> Self {
        Self(Arc::new(Mutex::new(pads)))
    }

    pub fn set(&self, index: usize, pad: Option<InputSnapshot>) {
        self.0.lock().unwrap()[index] = pad;
    }
}

impl InputBackend for FakePads {
    type Device = usize;

    fn devices(&mut self) -> Vec<usize> {
        let pads = self.0.lock().unwrap();
        (0..pads.len()).filter(|&i| pads[i].is_some()).collect()
    }

    fn sample(&mut self, device: usize) -> Option<InputSnapshot> {
        self.0.lock().unwrap().get(device).cloned().flatten()
    }
}

pub fn stick(axes: Vec<f32>, buttons: Vec<bool>) -> InputSnapshot {
    InputSnapshot::new(axes, buttons, Hat::default())
}
