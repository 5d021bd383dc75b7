pub mod config;
pub mod input;
pub mod messages;
pub mod motor;
pub mod runtime;

pub use input::{InputError, InputSource};
pub use messages::{Hat, InputSnapshot, MotorCommand};
pub use motor::{LinkError, MotorLink};
