// Port scan: READ-ONLY listing of serial ports and discovery result
//
// Nothing is opened or written - safe to run with the vehicle powered.
//
// Usage: cargo run --example port_scan -- [pattern]
// Example: cargo run --example port_scan -- Arduino

use rov_teleop_bridge::config::DEFAULT_DEVICE_MATCH;
use rov_teleop_bridge::motor::{LinkError, SerialBackend, SystemSerial, discover_port};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("debug".parse()?),
        )
        .init();

    let pattern = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DEVICE_MATCH.to_string());

    println!("Serial port scan (read-only)");
    println!("Match pattern: {:?}", pattern);
    println!();

    let backend = SystemSerial;
    let ports = backend.list_ports()?;
    if ports.is_empty() {
        println!("No serial ports visible.");
    }
    for port in &ports {
        let mark = if port.matches(&pattern) { "✓" } else { " " };
        println!("  {} {:<24} {}", mark, port.name, port.description);
        if !port.hwid.is_empty() {
            println!("    {}", port.hwid);
        }
    }
    println!();

    match discover_port(&backend, &pattern) {
        Ok(port) => println!("Discovery would use: {}", port),
        Err(LinkError::DeviceAbsent { .. }) => {
            println!("No port matches {:?}.", pattern);
            println!();
            println!("Troubleshooting:");
            println!("  - Check the USB cable is connected");
            println!("  - Pass a different pattern, or use --port with the bridge");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
