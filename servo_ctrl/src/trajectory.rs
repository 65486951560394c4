//! Sweep planning.
//!
//! Pure computation, no I/O: given the actuator's current angle, one target
//! snapshot and its configuration, decide whether a sweep is needed and how
//! the duty moves during it.
//!
//! A sweep always takes exactly `step_count` increments of equal size:
//!
//! ```text
//! duty_delta = duty_range * (target - current) / max_rotation_deg
//! increment  = round(duty_delta) / step_count        (integer division)
//! ```
//!
//! The truncation error of the integer division is not carried over to the
//! next sweep. The angle, on the other hand, is set to the exact target
//! after a sweep, so it never drifts.

use servo_common::actuator::ActuatorConfig;
use servo_common::consts::DEAD_BAND_DEG;
use std::ops::RangeInclusive;

/// A planned motion from the current angle to a new target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    /// Angle the actuator reports once the sweep completes (already mirrored
    /// for reversed actuators).
    pub target_angle: f32,
    /// Signed duty change applied at every step.
    pub increment: i64,
    /// Number of steps.
    pub steps: u32,
}

impl Sweep {
    /// Sum of all increments of this sweep.
    pub fn total_delta(&self) -> i64 {
        self.increment * self.steps as i64
    }

    /// Duty values written during the sweep, starting from `start`.
    ///
    /// Every value is clamped into `window`.
    pub fn duties(&self, start: u32, window: RangeInclusive<u32>) -> DutySteps {
        DutySteps {
            current: start as i64,
            increment: self.increment,
            remaining: self.steps,
            low: *window.start() as i64,
            high: *window.end() as i64,
        }
    }
}

/// Iterator over the duty values of one sweep.
#[derive(Debug, Clone)]
pub struct DutySteps {
    current: i64,
    increment: i64,
    remaining: u32,
    low: i64,
    high: i64,
}

impl Iterator for DutySteps {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.current = (self.current + self.increment).clamp(self.low, self.high);
        Some(self.current as u32)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for DutySteps {}

/// Map a raw snapshot into the actuator's own angle space.
///
/// Reversed actuators see `max_rotation_deg - snapshot`.
#[inline]
pub fn effective_target(config: &ActuatorConfig, snapshot: f32) -> f32 {
    if config.reversed {
        config.max_rotation_deg - snapshot
    } else {
        snapshot
    }
}

/// Unrounded duty change between two angles.
#[inline]
pub fn duty_delta(config: &ActuatorConfig, from_angle: f32, to_angle: f32) -> f64 {
    config.duty_range() as f64 * (to_angle as f64 - from_angle as f64)
        / config.max_rotation_deg as f64
}

/// Plan a sweep, or return `None` when this cycle is a no-op.
///
/// No-op cycles:
/// - the target moved less than the dead-band from the current angle
/// - the (mirrored) target lies outside `0..=max_rotation_deg` or is not finite
pub fn plan(config: &ActuatorConfig, current_angle: f32, snapshot: f32) -> Option<Sweep> {
    let target = effective_target(config, snapshot);
    if !target.is_finite() || target < 0.0 || target > config.max_rotation_deg {
        return None;
    }
    if (target - current_angle).abs() < DEAD_BAND_DEG {
        return None;
    }

    let steps = config.step_count();
    if steps == 0 {
        return None;
    }

    let rounded = duty_delta(config, current_angle, target).round() as i64;
    Some(Sweep {
        target_angle: target,
        increment: rounded / steps as i64,
        steps,
    })
}
