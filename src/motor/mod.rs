// Motor side of the bridge
//
// Provides:
// - Line protocol for seven-channel speed frames
// - Serial port discovery and access
// - Motor link with connect/write/disconnect lifecycle

mod link;
pub mod protocol;
pub mod serial;

pub use link::MotorLink;
pub use protocol::{FrameError, encode_frame, parse_frame};
pub use serial::{
    DeviceDescriptor, LinkError, PortInfo, SerialBackend, SerialHandle, SystemSerial,
    discover_port,
};
