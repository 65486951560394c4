//! Workspace-wide constants.
//!
//! Limits, defaults and the motion dead-band shared by the configuration
//! layer and the control loop.

/// Canonical service name (used when no fleet file overrides it).
pub const SERVICE_NAME: &str = "servo_fleet";

/// Default fleet configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/servo/fleet.toml";

/// Maximum number of actuators in one fleet (one per PWM channel).
pub const MAX_ACTUATORS: usize = 16;

/// Minimum angular change in degrees that triggers a sweep.
pub const DEAD_BAND_DEG: f32 = 0.5;

/// Highest supported PWM timer resolution.
pub const MAX_RESOLUTION_BITS: u8 = 20;

/// Microseconds per second, for pulse width to duty conversion.
pub const MICROS_PER_SECOND: u64 = 1_000_000;

// ─── Actuator Defaults ──────────────────────────────────────────────

/// Default rotation range in degrees.
pub const DEFAULT_MAX_ROTATION_DEG: f32 = 180.0;

/// Default time to complete one sweep.
pub const DEFAULT_SWEEP_PERIOD_MS: u32 = 1500;

/// Default interval between two duty steps (one PWM period at 50 Hz).
pub const DEFAULT_DUTY_UPDATE_PERIOD_MS: u32 = 20;

/// Default idle interval between control cycles.
pub const DEFAULT_REST_PERIOD_MS: u32 = 1000;

/// Default PWM timer resolution.
pub const DEFAULT_RESOLUTION_BITS: u8 = 15;

/// Default PWM frequency for hobby servos.
pub const DEFAULT_FREQUENCY_HZ: u32 = 50;

/// Default pulse width at 0 degrees.
pub const DEFAULT_MIN_PULSE_US: u32 = 500;

/// Default pulse width span covering the full rotation.
pub const DEFAULT_PULSE_RANGE_US: u32 = 2000;
