// Keyboard teleop over the motor link
// W/S surge, A/D sway, Z/X yaw, R/F heave, T toggles the tool, Q quits
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::{Duration, Instant};
use tracing::info;

use rov_teleop_bridge::config::LinkConfig;
use rov_teleop_bridge::messages::{MotorCommand, SPEED_NEUTRAL};
use rov_teleop_bridge::motor::MotorLink;

const STEP: u16 = 150; // throttle offset from neutral per keypress
const INPUT_TIMEOUT_MS: u64 = 100; // Back to neutral after this much time with no input

// Channel layout on the vehicle
const SURGE: usize = 0;
const SWAY: usize = 1;
const HEAVE: usize = 2;
const YAW: usize = 3;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = match std::env::args().nth(1) {
        Some(port) => LinkConfig::with_port(port),
        None => LinkConfig::default(),
    };
    let mut link = MotorLink::new(config);
    link.try_connect()?;

    info!("Controls: W/S surge, A/D sway, Z/X yaw, R/F heave, T tool, Q quit");

    enable_raw_mode()?;
    let result = run_teleop(&mut link);
    disable_raw_mode()?;

    result
}

fn run_teleop(link: &mut MotorLink) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut propulsion = [SPEED_NEUTRAL; 6];
    let mut tool_on = false;
    let mut last_movement_input = Instant::now();
    let mut link_down = false;

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;
                let axis = match code {
                    KeyCode::Char('w') if pressed => Some((SURGE, true)),
                    KeyCode::Char('s') if pressed => Some((SURGE, false)),
                    KeyCode::Char('d') if pressed => Some((SWAY, true)),
                    KeyCode::Char('a') if pressed => Some((SWAY, false)),
                    KeyCode::Char('r') if pressed => Some((HEAVE, true)),
                    KeyCode::Char('f') if pressed => Some((HEAVE, false)),
                    KeyCode::Char('x') if pressed => Some((YAW, true)),
                    KeyCode::Char('z') if pressed => Some((YAW, false)),
                    KeyCode::Char('t') if kind == KeyEventKind::Press => {
                        tool_on = !tool_on;
                        info!("Tool: {}", if tool_on { "ON" } else { "OFF" });
                        None
                    }
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,
                    _ => None,
                };

                if let Some((channel, positive)) = axis {
                    propulsion[channel] = if positive {
                        SPEED_NEUTRAL + STEP
                    } else {
                        SPEED_NEUTRAL - STEP
                    };
                    last_movement_input = Instant::now();
                }
            }
        }

        // Reset throttles if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            propulsion = [SPEED_NEUTRAL; 6];
        }

        let command = MotorCommand::new(propulsion, u16::from(tool_on));
        match link.write_speeds(Some(command)) {
            Ok(()) => link_down = false,
            Err(e) => {
                if !link_down {
                    info!("Link down: {}", e);
                    link_down = true;
                }
                // Retry once per loop until the controller comes back
                link.connect();
            }
        }
    }

    Ok(())
}
