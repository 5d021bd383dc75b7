// Gamepad backend over gilrs

use gilrs::{Axis, Button, Gamepad, GamepadId, Gilrs};
use tracing::warn;

use super::source::{InputBackend, InputError};
use crate::messages::{Hat, InputSnapshot};

/// Axis order in snapshots (only axes the device has are included)
pub const AXES: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::LeftZ,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::RightZ,
];

/// Button order in snapshots (only buttons the device has are included)
pub const BUTTONS: [Button; 13] = [
    Button::South,
    Button::East,
    Button::North,
    Button::West,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::Mode,
];

pub struct GilrsBackend {
    gilrs: Gilrs,
}

impl GilrsBackend {
    pub fn new() -> Result<Self, InputError> {
        match Gilrs::new() {
            Ok(gilrs) => Ok(Self { gilrs }),
            Err(gilrs::Error::NotImplemented(gilrs)) => {
                warn!("Gamepads are not supported on this platform, no devices will appear");
                Ok(Self { gilrs })
            }
            Err(e) => Err(InputError::Backend(e.to_string())),
        }
    }

    /// Drain pending events so cached gamepad state is current
    fn pump(&mut self) {
        while self.gilrs.next_event().is_some() {}
    }
}

impl InputBackend for GilrsBackend {
    type Device = GamepadId;

    fn devices(&mut self) -> Vec<GamepadId> {
        self.pump();
        self.gilrs
            .gamepads()
            .filter(|(_, gamepad)| gamepad.is_connected())
            .map(|(id, _)| id)
            .collect()
    }

    fn sample(&mut self, device: GamepadId) -> Option<InputSnapshot> {
        self.pump();
        let gamepad = self.gilrs.connected_gamepad(device)?;
        Some(snapshot(&gamepad))
    }
}

fn snapshot(gamepad: &Gamepad<'_>) -> InputSnapshot {
    let axes = AXES
        .iter()
        .filter(|&&axis| gamepad.axis_code(axis).is_some())
        .map(|&axis| gamepad.value(axis))
        .collect();

    let buttons = BUTTONS
        .iter()
        .filter(|&&button| gamepad.button_code(button).is_some())
        .map(|&button| gamepad.is_pressed(button))
        .collect();

    let hat = Hat::from_dpad(
        gamepad.is_pressed(Button::DPadUp),
        gamepad.is_pressed(Button::DPadDown),
        gamepad.is_pressed(Button::DPadLeft),
        gamepad.is_pressed(Button::DPadRight),
    );

    InputSnapshot::new(axes, buttons, hat)
}
