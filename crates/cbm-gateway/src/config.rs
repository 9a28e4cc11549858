//! Gateway configuration, loadable from TOML.
//!
//! Every timing constant of the translation engine is a named,
//! overridable value here rather than a magic number in the code.

use serde::Deserialize;

/// Top-level configuration for the gateway binary.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// CAN interface name (e.g. "can0" or "vcan0").
    pub can_interface: String,
    /// Input mapping file: one `<index> <device> <event>` binding per line.
    #[serde(default = "default_input_map")]
    pub input_map: String,
    /// Output mapping file, same format.
    #[serde(default = "default_output_map")]
    pub output_map: String,
    /// Number of logical boolean inputs (discrete inputs on the Modbus side).
    #[serde(default = "default_io_count")]
    pub input_count: usize,
    /// Number of logical boolean outputs (coils on the Modbus side).
    #[serde(default = "default_io_count")]
    pub output_count: usize,
    /// Bind address for the Modbus/TCP responder.
    #[serde(default = "default_modbus_bind")]
    pub modbus_bind: String,
    /// Base 11-bit CAN identifier for transmitted frames.
    #[serde(default = "default_can_base_id")]
    pub can_base_id: u16,
    /// Major priority field, 0 (highest) to 2.
    #[serde(default)]
    pub major_priority: u8,
    /// Minor priority field, 0 (highest) to 3.
    #[serde(default)]
    pub minor_priority: u8,
    /// Engine timing knobs.
    #[serde(default)]
    pub timing: Timing,
}

/// Translation engine timing. Counters tick once per driver-loop
/// iteration, so tick counts scale with `tick_interval_ms`.
#[derive(Debug, Clone, Deserialize)]
pub struct Timing {
    /// Ticks of silence before an output is re-announced or an input
    /// refresh is requested.
    #[serde(default = "default_refresh_timeout_ticks")]
    pub refresh_timeout_ticks: u32,
    /// Per-slot preload step at startup, spreading first timeouts across
    /// slots instead of bursting them all at once.
    #[serde(default = "default_stagger_ticks")]
    pub stagger_ticks: u32,
    /// Pause between successive startup status requests.
    #[serde(default = "default_startup_pacing_ms")]
    pub startup_pacing_ms: u64,
    /// Driver loop period.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            refresh_timeout_ticks: default_refresh_timeout_ticks(),
            stagger_ticks: default_stagger_ticks(),
            startup_pacing_ms: default_startup_pacing_ms(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

fn default_input_map() -> String {
    "cbus_inputs.dat".to_string()
}

fn default_output_map() -> String {
    "cbus_outputs.dat".to_string()
}

fn default_io_count() -> usize {
    128
}

fn default_modbus_bind() -> String {
    "0.0.0.0:1502".to_string()
}

fn default_can_base_id() -> u16 {
    cbm_protocol::DEFAULT_BASE_ID
}

fn default_refresh_timeout_ticks() -> u32 {
    30_000
}

fn default_stagger_ticks() -> u32 {
    500
}

fn default_startup_pacing_ms() -> u64 {
    10
}

fn default_tick_interval_ms() -> u64 {
    1
}

impl GatewayConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_minimal_config() {
        let toml = r#"
can_interface = "can0"
"#;
        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.can_interface, "can0");
        assert_eq!(config.input_map, "cbus_inputs.dat");
        assert_eq!(config.output_map, "cbus_outputs.dat");
        assert_eq!(config.input_count, 128);
        assert_eq!(config.output_count, 128);
        assert_eq!(config.modbus_bind, "0.0.0.0:1502");
        assert_eq!(config.can_base_id, 0x2FF);
        assert_eq!(config.major_priority, 0);
        assert_eq!(config.minor_priority, 0);
        assert_eq!(config.timing.refresh_timeout_ticks, 30_000);
        assert_eq!(config.timing.stagger_ticks, 500);
        assert_eq!(config.timing.startup_pacing_ms, 10);
        assert_eq!(config.timing.tick_interval_ms, 1);
    }

    #[test]
    fn deserialize_full_config() {
        let toml = r#"
can_interface = "vcan0"
input_map = "/etc/cbus2modbus/inputs.dat"
output_map = "/etc/cbus2modbus/outputs.dat"
input_count = 64
output_count = 32
modbus_bind = "127.0.0.1:502"
can_base_id = 0x123
major_priority = 1
minor_priority = 2

[timing]
refresh_timeout_ticks = 10000
stagger_ticks = 250
startup_pacing_ms = 5
tick_interval_ms = 2
"#;
        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.can_interface, "vcan0");
        assert_eq!(config.input_count, 64);
        assert_eq!(config.output_count, 32);
        assert_eq!(config.can_base_id, 0x123);
        assert_eq!(config.major_priority, 1);
        assert_eq!(config.timing.refresh_timeout_ticks, 10_000);
        assert_eq!(config.timing.stagger_ticks, 250);
        assert_eq!(config.timing.tick_interval_ms, 2);
    }
}
