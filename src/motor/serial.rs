// Serial port access for the motor link
//
// `SerialBackend` is the seam between `MotorLink` and the OS: it lists ports
// and opens them. `SystemSerial` is the real implementation over `serialport`;
// tests substitute an in-memory backend.

use std::io::{self, Write};
use std::time::Duration;

use serialport::{FlowControl, SerialPort, SerialPortType};
use tracing::debug;

/// Error types for the motor link
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("No serial port matching {pattern:?} found")]
    DeviceAbsent { pattern: String },

    #[error("Failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    #[error("Failed to enumerate serial ports: {0}")]
    Enumerate(serialport::Error),

    #[error("Motor link is not connected")]
    NotConnected,

    #[error("Write timed out after {timeout:?}")]
    WriteTimeout { timeout: Duration },

    #[error("Transmit failed: {0}")]
    Transmit(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, LinkError>;

/// Metadata for one serial port visible to the OS
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortInfo {
    /// Device path, e.g. `/dev/ttyACM0` or `COM3`
    pub name: String,
    /// Human readable manufacturer/product string
    pub description: String,
    /// Hardware id, e.g. `USB VID:PID=2341:0043 SER=...`
    pub hwid: String,
}

impl PortInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            hwid: String::new(),
        }
    }

    /// Case-insensitive substring match against any of the port's metadata
    pub fn matches(&self, pattern: &str) -> bool {
        let pattern = pattern.to_lowercase();
        [&self.name, &self.description, &self.hwid]
            .iter()
            .any(|field| field.to_lowercase().contains(&pattern))
    }
}

/// Resolved connection target: port plus line parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub port: String,
    pub baud_rate: u32,
    pub write_timeout: Duration,
}

/// An open serial session
pub trait SerialHandle: Write + Send {
    /// Whether the underlying device is still usable. Must reflect the OS
    /// state, not just the existence of the handle.
    fn is_alive(&self) -> bool;
}

pub trait SerialBackend {
    /// All serial ports currently visible, in enumeration order
    fn list_ports(&self) -> Result<Vec<PortInfo>>;

    /// Open a session on `device` with DTR deasserted and no flow control
    fn open(&self, device: &DeviceDescriptor) -> Result<Box<dyn SerialHandle>>;
}

/// Pick the first port whose metadata matches `pattern`
pub fn discover_port(backend: &dyn SerialBackend, pattern: &str) -> Result<String> {
    let ports = backend.list_ports()?;
    debug!("Found {} serial ports", ports.len());

    ports
        .into_iter()
        .find(|port| port.matches(pattern))
        .map(|port| port.name)
        .ok_or_else(|| LinkError::DeviceAbsent {
            pattern: pattern.to_string(),
        })
}

/// OS serial ports via the `serialport` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSerial;

impl SerialBackend for SystemSerial {
    fn list_ports(&self) -> Result<Vec<PortInfo>> {
        let ports = serialport::available_ports().map_err(LinkError::Enumerate)?;
        Ok(ports.into_iter().map(port_info).collect())
    }

    fn open(&self, device: &DeviceDescriptor) -> Result<Box<dyn SerialHandle>> {
        // DTR stays low so opening the port does not reset the board
        let port = serialport::new(&device.port, device.baud_rate)
            .timeout(device.write_timeout)
            .flow_control(FlowControl::None)
            .dtr_on_open(false)
            .open()
            .map_err(|source| LinkError::Open {
                port: device.port.clone(),
                source,
            })?;

        Ok(Box::new(SystemPort(port)))
    }
}

fn port_info(info: serialport::SerialPortInfo) -> PortInfo {
    let (description, hwid) = match info.port_type {
        SerialPortType::UsbPort(usb) => {
            let description = [usb.manufacturer.as_deref(), usb.product.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            let mut hwid = format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid);
            if let Some(serial) = usb.serial_number {
                hwid.push_str(&format!(" SER={}", serial));
            }
            (description, hwid)
        }
        SerialPortType::PciPort => ("PCI".to_string(), String::new()),
        SerialPortType::BluetoothPort => ("Bluetooth".to_string(), String::new()),
        SerialPortType::Unknown => (String::new(), String::new()),
    };

    PortInfo {
        name: info.port_name,
        description,
        hwid,
    }
}

struct SystemPort(Box<dyn SerialPort>);

impl Write for SystemPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl SerialHandle for SystemPort {
    fn is_alive(&self) -> bool {
        // Fails once the device has been unplugged or closed by the OS
        self.0.bytes_to_read().is_ok()
    }
}
