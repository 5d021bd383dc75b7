use rov_teleop_bridge::config::LinkConfig;
use rov_teleop_bridge::input::InputError;
use rov_teleop_bridge::motor::{MotorLink, PortInfo};
use rov_teleop_bridge::runtime::{Runtime, axis_mapping};
use rov_teleop_bridge::{InputSource, MotorCommand};

mod common;
use common::{FakePads, FakeSerial, stick};

#[test]
fn input_source_without_devices() {
    let mut input = InputSource::with_backend(FakePads::default());
    assert!(!input.connect());
    assert!(!input.is_connected());
    assert_eq!(input.read_values(), Err(InputError::NotConnected));
}

#[test]
fn tick_maps_input_to_frame() {
    let serial = FakeSerial::arduino();
    let wire = serial.wire();
    let pads = FakePads::with(vec![Some(stick(vec![1.0, -1.0], vec![true]))]);

    let mut runtime = Runtime::new(
        MotorLink::with_backend(serial, LinkConfig::default()),
        InputSource::with_backend(pads),
        axis_mapping,
    );

    let report = runtime.tick();
    assert!(report.input_connected);
    assert!(report.motor_connected);
    assert_eq!(
        report.sent,
        Some(MotorCommand([2000, 1000, 1500, 1500, 1500, 1500, 1]))
    );
    assert_eq!(wire.frames(), ["!2000,1000,1500,1500,1500,1500,1;"]);
}

#[test]
fn missing_input_sends_neutral() {
    let serial = FakeSerial::arduino();
    let wire = serial.wire();

    let mut runtime = Runtime::new(
        MotorLink::with_backend(serial, LinkConfig::default()),
        InputSource::with_backend(FakePads::default()),
        axis_mapping,
    );

    let report = runtime.tick();
    assert!(!report.input_connected);
    assert_eq!(report.snapshot, None);
    assert_eq!(report.sent, Some(MotorCommand::NEUTRAL));
    assert_eq!(wire.frames(), ["!1500,1500,1500,1500,1500,1500,0;"]);
}

#[test]
fn lost_input_falls_back_to_neutral_then_recovers() {
    let serial = FakeSerial::arduino();
    let wire = serial.wire();
    let pads = FakePads::with(vec![Some(stick(vec![0.5], vec![]))]);

    let mut runtime = Runtime::new(
        MotorLink::with_backend(serial, LinkConfig::default()),
        InputSource::with_backend(pads.clone()),
        axis_mapping,
    );

    runtime.tick();
    pads.set(0, None);
    let lost = runtime.tick();
    assert!(!lost.input_connected);
    pads.set(0, Some(stick(vec![-0.5], vec![])));
    let back = runtime.tick();
    assert!(back.input_connected);

    assert_eq!(
        wire.frames(),
        [
            "!1750,1500,1500,1500,1500,1500,0;",
            "!1500,1500,1500,1500,1500,1500,0;",
            "!1250,1500,1500,1500,1500,1500,0;",
        ]
    );
}

#[test]
fn mapper_declining_sends_neutral() {
    let serial = FakeSerial::arduino();
    let wire = serial.wire();
    let pads = FakePads::with(vec![Some(stick(vec![1.0], vec![]))]);

    let mut runtime = Runtime::new(
        MotorLink::with_backend(serial, LinkConfig::default()),
        InputSource::with_backend(pads),
        |_: &rov_teleop_bridge::InputSnapshot| None,
    );

    let report = runtime.tick();
    assert!(report.snapshot.is_some());
    assert_eq!(report.sent, Some(MotorCommand::NEUTRAL));
    assert_eq!(wire.frames(), ["!1500,1500,1500,1500,1500,1500,0;"]);
}

#[test]
fn motor_reconnects_on_later_tick() {
    let serial = FakeSerial::arduino();
    let wire = serial.wire();
    wire.unplug();

    let mut runtime = Runtime::new(
        MotorLink::with_backend(serial, LinkConfig::default()),
        InputSource::with_backend(FakePads::default()),
        axis_mapping,
    );

    let offline = runtime.tick();
    assert!(!offline.motor_connected);
    assert_eq!(offline.sent, None);
    assert!(wire.written().is_empty());

    wire.replug();
    let online = runtime.tick();
    assert!(online.motor_connected);
    assert_eq!(online.sent, Some(MotorCommand::NEUTRAL));
}

#[test]
fn no_serial_device_never_writes() {
    let serial = FakeSerial::with_ports(vec![PortInfo::new("/dev/ttyS0", "PCI")]);
    let wire = serial.wire();

    let mut runtime = Runtime::new(
        MotorLink::with_backend(serial, LinkConfig::default()),
        InputSource::with_backend(FakePads::default()),
        axis_mapping,
    );

    for _ in 0..3 {
        assert_eq!(runtime.tick().sent, None);
    }
    assert!(wire.opened().is_empty());
    assert!(!runtime.motor().is_connected());
}

#[test]
fn dropping_runtime_leaves_neutral_on_wire() {
    let serial = FakeSerial::arduino();
    let wire = serial.wire();
    let pads = FakePads::with(vec![Some(stick(vec![1.0], vec![]))]);

    let mut runtime = Runtime::new(
        MotorLink::with_backend(serial, LinkConfig::default()),
        InputSource::with_backend(pads),
        axis_mapping,
    );
    runtime.tick();
    drop(runtime);

    assert_eq!(
        wire.frames().last().map(String::as_str),
        Some("!1500,1500,1500,1500,1500,1500,0;")
    );
}
