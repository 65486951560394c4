//! PWM output port trait and error types.
//!
//! This module defines:
//! - `PwmOutput` trait - Interface for pluggable PWM backends
//! - `PwmError` enum - Error types for PWM operations
//! - `PwmFactory` type alias - Factory function type
//! - `ChannelSetup` struct - One-time channel configuration

use crate::actuator::ActuatorConfig;
use std::sync::Arc;
use thiserror::Error;

/// Error types for PWM operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PwmError {
    /// Channel was written before `configure()`.
    #[error("PWM channel {0} is not configured")]
    NotConfigured(u8),

    /// Channel number not supported by the backend.
    #[error("Invalid PWM channel: {0}")]
    InvalidChannel(u8),

    /// Duty value above the channel resolution.
    #[error("Duty {duty} out of range on channel {channel} (max {max})")]
    DutyOutOfRange {
        /// Channel written.
        channel: u8,
        /// Rejected duty value.
        duty: u32,
        /// Largest duty the channel accepts.
        max: u32,
    },

    /// Hardware communication error.
    #[error("PWM communication error: {0}")]
    Communication(String),
}

/// Factory function type for creating PWM backends.
pub type PwmFactory = fn() -> Arc<dyn PwmOutput>;

/// Channel configuration applied once before a servo is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSetup {
    /// Output channel.
    pub channel: u8,
    /// Timer feeding the channel.
    pub timer: u8,
    /// Output pin.
    pub gpio: u8,
    /// Timer resolution in bits.
    pub resolution_bits: u8,
    /// PWM frequency in Hz.
    pub frequency_hz: u32,
    /// Duty emitted right after configuration.
    pub initial_duty: u32,
}

impl ChannelSetup {
    /// Largest duty value the channel accepts.
    pub fn max_duty(&self) -> u32 {
        ((1u64 << self.resolution_bits.min(32)) - 1) as u32
    }
}

impl From<&ActuatorConfig> for ChannelSetup {
    fn from(config: &ActuatorConfig) -> Self {
        Self {
            channel: config.channel,
            timer: config.timer,
            gpio: config.gpio,
            resolution_bits: config.resolution_bits,
            frequency_hz: config.frequency_hz,
            initial_duty: config.initial_duty(),
        }
    }
}

/// Trait defining the interface for PWM output ports.
///
/// One port is shared by every actuator worker of a fleet, so all methods
/// take `&self`; implementations keep per-channel state behind their own
/// synchronization (hardware registers, atomics, or a lock in simulation).
///
/// # Lifecycle
///
/// 1. `configure()` - Called once per channel before the fleet starts
/// 2. `set_duty()` + `commit()` - Called on every duty step of a sweep
/// 3. `shutdown()` - Called when the owning application exits
///
/// # Timing Contracts
///
/// | Operation | Max Duration | Constraint |
/// |-----------|--------------|------------|
/// | `configure()` | unbounded | before workers start |
/// | `set_duty()` + `commit()` | well below `duty_update_period` | called from workers |
/// | `shutdown()` | 1 second | after workers joined |
pub trait PwmOutput: Send + Sync {
    /// Returns the backend's unique identifier (e.g., "simulation", "ledc").
    fn name(&self) -> &'static str;

    /// Returns the backend's semantic version.
    fn version(&self) -> &'static str;

    /// Configure timer and channel, then emit the initial duty.
    ///
    /// # Errors
    /// Return `PwmError::InvalidChannel` if the backend has no such channel.
    fn configure(&self, setup: &ChannelSetup) -> Result<(), PwmError>;

    /// Stage a new duty value on a channel.
    fn set_duty(&self, channel: u8, duty: u32) -> Result<(), PwmError>;

    /// Latch the staged duty so it appears on the output.
    fn commit(&self, channel: u8) -> Result<(), PwmError>;

    /// Stage and latch in one call.
    fn write(&self, channel: u8, duty: u32) -> Result<(), PwmError> {
        self.set_duty(channel, duty)?;
        self.commit(channel)
    }

    /// Release the backend.
    /// Default: no-op
    fn shutdown(&self) -> Result<(), PwmError> {
        Ok(())
    }
}

static_assertions::assert_obj_safe!(PwmOutput);
