// Fixed-rate control loop: read input -> map -> write motor frame
// Whenever no real command is available (input missing, mapper declined) the
// neutral command goes out instead, so the wire never carries stale speeds.

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

// local imports
use crate::config::BridgeConfig;
use crate::input::{InputBackend, InputSource};
use crate::messages::{CHANNELS, InputSnapshot, MotorCommand, SPEED_MAX, SPEED_MIN, SPEED_NEUTRAL};
use crate::motor::{MotorLink, SerialBackend};

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub input_connected: bool,
    pub motor_connected: bool,
    /// Input read this tick, if any
    pub snapshot: Option<InputSnapshot>,
    /// Frame that reached the wire, `None` if nothing was sent
    pub sent: Option<MotorCommand>,
}

pub struct Runtime<B, I, M>
where
    B: SerialBackend,
    I: InputBackend,
    M: FnMut(&InputSnapshot) -> Option<MotorCommand>,
{
    motor: MotorLink<B>,
    input: InputSource<I>,
    mapper: M,
    last_motor_error: Option<String>,
}

impl<B, I, M> Runtime<B, I, M>
where
    B: SerialBackend,
    I: InputBackend,
    M: FnMut(&InputSnapshot) -> Option<MotorCommand>,
{
    pub fn new(motor: MotorLink<B>, input: InputSource<I>, mapper: M) -> Self {
        Self {
            motor,
            input,
            mapper,
            last_motor_error: None,
        }
    }

    pub fn motor(&self) -> &MotorLink<B> {
        &self.motor
    }

    pub fn input(&self) -> &InputSource<I> {
        &self.input
    }

    /// Run one read -> map -> write cycle, reconnecting whatever is down
    pub fn tick(&mut self) -> TickReport {
        if !self.input.is_connected() {
            self.input.connect();
        }
        self.ensure_motor();

        let snapshot = if self.input.is_connected() {
            match self.input.read_values() {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    debug!("No input this tick: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let command = snapshot.as_ref().and_then(|s| (self.mapper)(s));

        let sent = if self.motor.is_connected() {
            match self.motor.write_speeds(command) {
                Ok(()) => Some(command.unwrap_or(MotorCommand::NEUTRAL)),
                // Link already logged and dropped the session
                Err(_) => None,
            }
        } else {
            None
        };

        TickReport {
            input_connected: self.input.is_connected(),
            motor_connected: self.motor.is_connected(),
            snapshot,
            sent,
        }
    }

    // Only log connect failures when the reason changes, not every tick
    fn ensure_motor(&mut self) {
        if self.motor.is_connected() {
            return;
        }
        match self.motor.try_connect() {
            Ok(()) => self.last_motor_error = None,
            Err(e) => {
                let reason = e.to_string();
                if self.last_motor_error.as_deref() != Some(reason.as_str()) {
                    warn!("Motor link unavailable: {}", reason);
                    self.last_motor_error = Some(reason);
                }
            }
        }
    }
}

/// Default joystick mapping: axis i drives propulsion channel i around
/// neutral, button 0 switches the auxiliary channel on
pub fn axis_mapping(snapshot: &InputSnapshot) -> Option<MotorCommand> {
    let half_range = f32::from(SPEED_MAX - SPEED_MIN) / 2.0;
    let mut propulsion = [SPEED_NEUTRAL; CHANNELS - 1];

    for (i, slot) in propulsion.iter_mut().enumerate() {
        if let Some(value) = snapshot.axis(i) {
            *slot = (f32::from(SPEED_NEUTRAL) + value * half_range).round() as u16;
        }
    }

    let aux = u16::from(snapshot.button(0));
    Some(MotorCommand::new(propulsion, aux).clamped())
}

pub async fn run(
    config: BridgeConfig,
    dump_input: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    config.validate()?;

    let motor = MotorLink::new(config.link.clone());
    let input = InputSource::new()?;
    let mut runtime = Runtime::new(motor, input, axis_mapping);

    let mut tick = interval(config.tick_period());
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        "Bridge started: {}Hz loop, {}ms write timeout",
        config.loop_hz, config.link.write_timeout_ms
    );
    match &config.link.port {
        Some(port) => info!("Motor port: {}", port),
        None => info!("Motor port: auto ({:?})", config.link.device_match),
    }

    let mut was_sending = false;
    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }

        let report = runtime.tick();

        if dump_input {
            if let Some(snapshot) = &report.snapshot {
                println!("{}", serde_json::to_string(snapshot)?);
            }
        }

        let sending = report.sent.is_some();
        if sending != was_sending {
            if sending {
                info!("Sending motor commands");
            } else {
                warn!("Motor commands suspended until the link reconnects");
            }
            was_sending = sending;
        }
    }

    // Dropping the runtime sends neutral and closes the port
    drop(runtime);
    Ok(())
}
