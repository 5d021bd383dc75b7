// Human input side of the bridge
//
// Provides:
// - Polled input source with connect/disconnect lifecycle
// - Gamepad backend over gilrs

pub mod gamepad;
mod source;

pub use gamepad::GilrsBackend;
pub use source::{InputBackend, InputError, InputSource};
