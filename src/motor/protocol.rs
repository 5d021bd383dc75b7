// Line protocol spoken by the motor controller firmware
//
// Frame format (ASCII): `!s1,s2,s3,s4,s5,s6,s7;\n`
// No acknowledgement or checksum: frames are fire-and-forget.

use crate::messages::{CHANNELS, MotorCommand};

/// Frame start marker
pub const START: char = '!';
/// Frame terminator (followed by a newline on the wire)
pub const END: char = ';';

/// Errors returned when parsing a frame
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("Frame does not start with '!'")]
    MissingStart,

    #[error("Frame does not end with ';'")]
    MissingEnd,

    #[error("Expected 7 values, got {0}")]
    WrongArity(usize),

    #[error("Invalid value {0:?}")]
    InvalidValue(String),
}

/// Encode a command as a single newline-terminated frame
pub fn encode_frame(command: &MotorCommand) -> String {
    let body = command
        .0
        .iter()
        .map(|speed| speed.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("{START}{body}{END}\n")
}

/// Parse one frame back into a command. Accepts the frame with or without
/// its trailing newline.
pub fn parse_frame(line: &str) -> Result<MotorCommand, FrameError> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    let body = line.strip_prefix(START).ok_or(FrameError::MissingStart)?;
    let body = body.strip_suffix(END).ok_or(FrameError::MissingEnd)?;

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() != CHANNELS {
        return Err(FrameError::WrongArity(fields.len()));
    }

    let mut speeds = [0u16; CHANNELS];
    for (slot, field) in speeds.iter_mut().zip(&fields) {
        *slot = field
            .parse()
            .map_err(|_| FrameError::InvalidValue(field.to_string()))?;
    }
    Ok(MotorCommand(speeds))
}
