// Data passed between the input side, the mapper and the motor link

use serde::{Deserialize, Serialize};

/// Number of channels in every motor command frame
pub const CHANNELS: usize = 7;

/// PWM-style throttle limits for the six propulsion channels
pub const SPEED_MIN: u16 = 1000;
pub const SPEED_MAX: u16 = 2000;
pub const SPEED_NEUTRAL: u16 = 1500;

/// Auxiliary/tool channel value meaning "off"
pub const AUX_OFF: u16 = 0;

/// Seven-channel speed command for the remote motor controller
///
/// Slots 0..6 are propulsion throttles in `SPEED_MIN..=SPEED_MAX`, slot 6 is
/// the discrete auxiliary channel. Arity is fixed by the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorCommand(pub [u16; CHANNELS]);

impl MotorCommand {
    /// Safe default sent whenever no real command is available
    pub const NEUTRAL: Self = Self([
        SPEED_NEUTRAL,
        SPEED_NEUTRAL,
        SPEED_NEUTRAL,
        SPEED_NEUTRAL,
        SPEED_NEUTRAL,
        SPEED_NEUTRAL,
        AUX_OFF,
    ]);

    pub fn new(propulsion: [u16; CHANNELS - 1], aux: u16) -> Self {
        let mut speeds = [AUX_OFF; CHANNELS];
        speeds[..CHANNELS - 1].copy_from_slice(&propulsion);
        speeds[CHANNELS - 1] = aux;
        Self(speeds)
    }

    /// Returns a copy with the propulsion channels clamped into range.
    /// The auxiliary channel is left untouched.
    pub fn clamped(self) -> Self {
        let mut speeds = self.0;
        for speed in &mut speeds[..CHANNELS - 1] {
            *speed = (*speed).clamp(SPEED_MIN, SPEED_MAX);
        }
        Self(speeds)
    }

    pub fn propulsion(&self) -> &[u16] {
        &self.0[..CHANNELS - 1]
    }

    pub fn aux(&self) -> u16 {
        self.0[CHANNELS - 1]
    }

    pub fn as_array(&self) -> [u16; CHANNELS] {
        self.0
    }
}

impl Default for MotorCommand {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl From<[u16; CHANNELS]> for MotorCommand {
    fn from(speeds: [u16; CHANNELS]) -> Self {
        Self(speeds)
    }
}

/// Discrete directional pad position, each component in {-1, 0, 1}
/// (right = +x, up = +y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hat {
    pub x: i8,
    pub y: i8,
}

impl Hat {
    pub fn new(x: i8, y: i8) -> Self {
        Self {
            x: x.signum(),
            y: y.signum(),
        }
    }

    /// Builds a hat value from the four D-pad buttons
    pub fn from_dpad(up: bool, down: bool, left: bool, right: bool) -> Self {
        Self {
            x: right as i8 - left as i8,
            y: up as i8 - down as i8,
        }
    }
}

/// One poll of the input device. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSnapshot {
    axes: Vec<f32>,
    buttons: Vec<bool>,
    hat: Hat,
}

impl InputSnapshot {
    /// Axis values are clamped to [-1.0, 1.0]; NaN reads as centred.
    pub fn new(axes: Vec<f32>, buttons: Vec<bool>, hat: Hat) -> Self {
        let axes = axes
            .into_iter()
            .map(|v| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) })
            .collect();
        Self { axes, buttons, hat }
    }

    pub fn axes(&self) -> &[f32] {
        &self.axes
    }

    pub fn buttons(&self) -> &[bool] {
        &self.buttons
    }

    pub fn hat(&self) -> Hat {
        self.hat
    }

    /// Axis value by index, `None` if the device has fewer axes
    pub fn axis(&self, index: usize) -> Option<f32> {
        self.axes.get(index).copied()
    }

    /// Button state by index; buttons the device lacks read as released
    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }
}
