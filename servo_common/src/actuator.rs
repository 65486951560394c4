//! Actuator and fleet configuration types.
//!
//! This module contains the configuration consumed by the servo control core:
//! - `ActuatorConfig` - Immutable per-servo description (timing, duty window, channel)
//! - `FleetConfig` - Main configuration loaded from `fleet.toml`
//!
//! All pulse widths are given in microseconds and converted to hardware duty
//! units with the channel's resolution and frequency, so a file stays valid
//! when the PWM timer resolution changes.

use crate::config::{ConfigError, ConfigLoader, SharedConfig};
use crate::consts::{
    DEFAULT_DUTY_UPDATE_PERIOD_MS, DEFAULT_FREQUENCY_HZ, DEFAULT_MAX_ROTATION_DEG,
    DEFAULT_MIN_PULSE_US, DEFAULT_PULSE_RANGE_US, DEFAULT_RESOLUTION_BITS,
    DEFAULT_REST_PERIOD_MS, DEFAULT_SWEEP_PERIOD_MS, MAX_ACTUATORS, MAX_RESOLUTION_BITS,
    MICROS_PER_SECOND,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

fn default_max_rotation_deg() -> f32 {
    DEFAULT_MAX_ROTATION_DEG
}

fn default_sweep_period_ms() -> u32 {
    DEFAULT_SWEEP_PERIOD_MS
}

fn default_duty_update_period_ms() -> u32 {
    DEFAULT_DUTY_UPDATE_PERIOD_MS
}

fn default_rest_period_ms() -> u32 {
    DEFAULT_REST_PERIOD_MS
}

fn default_resolution_bits() -> u8 {
    DEFAULT_RESOLUTION_BITS
}

fn default_frequency_hz() -> u32 {
    DEFAULT_FREQUENCY_HZ
}

fn default_min_pulse_us() -> u32 {
    DEFAULT_MIN_PULSE_US
}

fn default_pulse_range_us() -> u32 {
    DEFAULT_PULSE_RANGE_US
}

/// Immutable configuration of one servo.
///
/// # TOML Example
///
/// ```toml
/// [[actuators]]
/// id = 0
/// channel = 0
/// gpio = 16
/// sweep_period_ms = 1750
/// rest_period_ms = 500
/// reversed = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActuatorConfig {
    /// Actuator identifier (used in logs and status snapshots).
    pub id: u8,

    /// PWM output channel driving this servo.
    pub channel: u8,

    /// PWM timer feeding the channel.
    #[serde(default)]
    pub timer: u8,

    /// Output pin routed to the channel.
    #[serde(default)]
    pub gpio: u8,

    /// Full rotation range in degrees.
    #[serde(default = "default_max_rotation_deg")]
    pub max_rotation_deg: f32,

    /// Time to complete one sweep, whatever its amplitude.
    #[serde(default = "default_sweep_period_ms")]
    pub sweep_period_ms: u32,

    /// Interval between two duty increments.
    #[serde(default = "default_duty_update_period_ms")]
    pub duty_update_period_ms: u32,

    /// Idle interval between control cycles.
    #[serde(default = "default_rest_period_ms")]
    pub rest_period_ms: u32,

    /// Mirror targets (`max_rotation_deg - target`) for servos mounted reversed.
    #[serde(default)]
    pub reversed: bool,

    /// PWM timer resolution in bits.
    #[serde(default = "default_resolution_bits")]
    pub resolution_bits: u8,

    /// PWM frequency in Hz.
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: u32,

    /// Pulse width at 0 degrees.
    #[serde(default = "default_min_pulse_us")]
    pub min_pulse_us: u32,

    /// Pulse width span covering `max_rotation_deg`.
    #[serde(default = "default_pulse_range_us")]
    pub pulse_range_us: u32,

    /// Pulse width emitted before the first sweep. Defaults to `min_pulse_us`.
    #[serde(default)]
    pub initial_pulse_us: Option<u32>,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            id: 0,
            channel: 0,
            timer: 0,
            gpio: 0,
            max_rotation_deg: DEFAULT_MAX_ROTATION_DEG,
            sweep_period_ms: DEFAULT_SWEEP_PERIOD_MS,
            duty_update_period_ms: DEFAULT_DUTY_UPDATE_PERIOD_MS,
            rest_period_ms: DEFAULT_REST_PERIOD_MS,
            reversed: false,
            resolution_bits: DEFAULT_RESOLUTION_BITS,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            min_pulse_us: DEFAULT_MIN_PULSE_US,
            pulse_range_us: DEFAULT_PULSE_RANGE_US,
            initial_pulse_us: None,
        }
    }
}

impl ActuatorConfig {
    /// Number of duty increments in one sweep.
    pub fn step_count(&self) -> u32 {
        self.sweep_period_ms
            .checked_div(self.duty_update_period_ms)
            .unwrap_or(0)
    }

    /// Sweep period as Duration.
    pub fn sweep_period(&self) -> Duration {
        Duration::from_millis(self.sweep_period_ms as u64)
    }

    /// Duty update period as Duration.
    pub fn duty_update_period(&self) -> Duration {
        Duration::from_millis(self.duty_update_period_ms as u64)
    }

    /// Rest period as Duration.
    pub fn rest_period(&self) -> Duration {
        Duration::from_millis(self.rest_period_ms as u64)
    }

    /// Largest duty value the channel resolution can express.
    pub fn max_duty(&self) -> u32 {
        ((1u64 << self.resolution_bits.min(MAX_RESOLUTION_BITS)) - 1) as u32
    }

    /// Convert a pulse width to hardware duty units.
    ///
    /// `duty = 2^bits * pulse_us / period_us`, truncated. `None` if the
    /// result does not fit in `u32`.
    pub fn pulse_to_duty(&self, pulse_us: u32) -> Option<u32> {
        let full_scale = 1u64 << self.resolution_bits.min(MAX_RESOLUTION_BITS);
        let scaled = full_scale
            .checked_mul(pulse_us as u64)?
            .checked_mul(self.frequency_hz as u64)?;
        u32::try_from(scaled / MICROS_PER_SECOND).ok()
    }

    /// Duty units spanning the full rotation.
    ///
    /// Saturates at `u32::MAX` for configurations `validate()` rejects.
    pub fn duty_range(&self) -> u32 {
        self.pulse_to_duty(self.pulse_range_us).unwrap_or(u32::MAX)
    }

    /// Duty value emitted before the first sweep.
    pub fn initial_duty(&self) -> u32 {
        self.pulse_to_duty(self.initial_pulse_us.unwrap_or(self.min_pulse_us))
            .unwrap_or(u32::MAX)
    }

    /// Duty values this servo may ever be driven with.
    pub fn duty_window(&self) -> RangeInclusive<u32> {
        let low = self.pulse_to_duty(self.min_pulse_us).unwrap_or(u32::MAX);
        let high = self
            .min_pulse_us
            .checked_add(self.pulse_range_us)
            .and_then(|pulse| self.pulse_to_duty(pulse))
            .unwrap_or(u32::MAX);
        low..=high
    }

    /// Validate the actuator configuration.
    ///
    /// # Validation Rules
    /// 1. `duty_update_period_ms` > 0 and `step_count()` > 0
    /// 2. `max_rotation_deg` finite and > 0
    /// 3. `resolution_bits` in 1..=MAX_RESOLUTION_BITS
    /// 4. `frequency_hz` > 0 and `pulse_range_us` > 0
    /// 5. Duty window fits in the resolution, and spans at least one unit
    /// 6. Initial pulse inside the pulse window
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: String| {
            Err(ConfigError::ValidationError(format!(
                "actuator {}: {msg}",
                self.id
            )))
        };

        if self.duty_update_period_ms == 0 {
            return fail("duty_update_period_ms must be greater than 0".to_string());
        }
        if self.step_count() == 0 {
            return fail(format!(
                "sweep_period_ms ({}) must be at least duty_update_period_ms ({})",
                self.sweep_period_ms, self.duty_update_period_ms
            ));
        }
        if !self.max_rotation_deg.is_finite() || self.max_rotation_deg <= 0.0 {
            return fail(format!(
                "max_rotation_deg must be a positive number, got {}",
                self.max_rotation_deg
            ));
        }
        if self.resolution_bits == 0 || self.resolution_bits > MAX_RESOLUTION_BITS {
            return fail(format!(
                "resolution_bits must be in 1..={MAX_RESOLUTION_BITS}, got {}",
                self.resolution_bits
            ));
        }
        if self.frequency_hz == 0 {
            return fail("frequency_hz must be greater than 0".to_string());
        }
        if self.pulse_range_us == 0 {
            return fail("pulse_range_us must be greater than 0".to_string());
        }

        let max_pulse = self.min_pulse_us.checked_add(self.pulse_range_us);
        let pulses = [
            Some(self.min_pulse_us),
            Some(self.pulse_range_us),
            max_pulse,
            self.initial_pulse_us,
        ];
        if max_pulse.is_none()
            || pulses
                .into_iter()
                .flatten()
                .any(|pulse| self.pulse_to_duty(pulse).is_none())
        {
            return fail(format!(
                "pulse widths {}+{} us overflow duty arithmetic at {} bits, {} Hz",
                self.min_pulse_us, self.pulse_range_us, self.resolution_bits, self.frequency_hz
            ));
        }

        let window = self.duty_window();
        if *window.end() > self.max_duty() {
            return fail(format!(
                "duty window {}..={} exceeds {}-bit resolution (max {})",
                window.start(),
                window.end(),
                self.resolution_bits,
                self.max_duty()
            ));
        }
        if self.duty_range() == 0 {
            return fail(format!(
                "pulse_range_us {} is below one duty unit at {} bits",
                self.pulse_range_us, self.resolution_bits
            ));
        }

        if let Some(initial) = self.initial_pulse_us {
            let max_pulse = self.min_pulse_us.saturating_add(self.pulse_range_us);
            if initial < self.min_pulse_us || initial > max_pulse {
                return fail(format!(
                    "initial_pulse_us {initial} outside {}..={max_pulse}",
                    self.min_pulse_us
                ));
            }
        }

        Ok(())
    }
}

/// Main configuration loaded from `fleet.toml`.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "arm-servos"
///
/// [[actuators]]
/// id = 0
/// channel = 0
/// gpio = 16
///
/// [[actuators]]
/// id = 1
/// channel = 1
/// gpio = 17
/// reversed = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FleetConfig {
    /// Common application settings.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Actuators in launch order.
    #[serde(default)]
    pub actuators: Vec<ActuatorConfig>,
}

impl FleetConfig {
    /// Load `fleet.toml` and validate it.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the fleet configuration.
    ///
    /// # Validation Rules
    /// 1. Shared section valid
    /// 2. 1..=MAX_ACTUATORS actuators, each valid
    /// 3. Actuator ids unique
    /// 4. PWM channels unique
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.actuators.is_empty() {
            return Err(ConfigError::ValidationError(
                "fleet must define at least one actuator".to_string(),
            ));
        }
        if self.actuators.len() > MAX_ACTUATORS {
            return Err(ConfigError::ValidationError(format!(
                "Too many actuators: {} (max {})",
                self.actuators.len(),
                MAX_ACTUATORS
            )));
        }

        let mut ids = HashSet::new();
        let mut channels = HashSet::new();
        for actuator in &self.actuators {
            actuator.validate()?;
            if !ids.insert(actuator.id) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate actuator id: {}",
                    actuator.id
                )));
            }
            if !channels.insert(actuator.channel) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate PWM channel: {} (actuator {})",
                    actuator.channel, actuator.id
                )));
            }
        }

        Ok(())
    }
}

static_assertions::assert_impl_all!(ActuatorConfig: Send, Sync, Clone);
