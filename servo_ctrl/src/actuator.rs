//! Actuator state and status snapshots.
//!
//! An `Actuator` pairs an immutable [`ActuatorConfig`] with the runtime state
//! its worker mutates: current duty, current angle, the cancel flag and a
//! couple of counters. Runtime fields are atomics behind an `Arc` so that
//! [`ActuatorMonitor`] can take a status snapshot from any thread without
//! blocking the worker. The worker is still the only writer of duty and
//! angle.
//!
//! Target rebinding needs `&mut Actuator`. While a worker runs it owns the
//! actuator by value, so rebinding is only possible on a stopped actuator.

use crate::target::{TargetBinding, TargetCell};
use serde::Serialize;
use servo_common::actuator::ActuatorConfig;
use servo_common::config::ConfigError;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Mutable runtime state of one actuator.
#[derive(Debug)]
pub(crate) struct RuntimeState {
    duty: AtomicU32,
    angle_bits: AtomicU32,
    last_target_bits: AtomicU32,
    canceled: AtomicBool,
    sweeps: AtomicU64,
    pwm_errors: AtomicU64,
}

impl RuntimeState {
    fn new(initial_duty: u32) -> Self {
        Self {
            duty: AtomicU32::new(initial_duty),
            angle_bits: AtomicU32::new(0.0f32.to_bits()),
            last_target_bits: AtomicU32::new(0.0f32.to_bits()),
            canceled: AtomicBool::new(false),
            sweeps: AtomicU64::new(0),
            pwm_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn duty(&self) -> u32 {
        self.duty.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn set_duty(&self, duty: u32) {
        self.duty.store(duty, Ordering::Release);
    }

    #[inline]
    pub(crate) fn angle(&self) -> f32 {
        f32::from_bits(self.angle_bits.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn set_angle(&self, angle: f32) {
        self.angle_bits.store(angle.to_bits(), Ordering::Release);
    }

    /// Target snapshot the worker read in its latest cycle.
    #[inline]
    pub(crate) fn last_target(&self) -> f32 {
        f32::from_bits(self.last_target_bits.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn record_target(&self, snapshot: f32) {
        self.last_target_bits
            .store(snapshot.to_bits(), Ordering::Release);
    }

    #[inline]
    pub(crate) fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    #[inline]
    pub(crate) fn set_canceled(&self, canceled: bool) {
        self.canceled.store(canceled, Ordering::SeqCst);
    }

    pub(crate) fn record_sweep(&self) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the failure count including this one.
    pub(crate) fn record_pwm_error(&self) -> u64 {
        self.pwm_errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn sweeps(&self) -> u64 {
        self.sweeps.load(Ordering::Relaxed)
    }

    fn pwm_errors(&self) -> u64 {
        self.pwm_errors.load(Ordering::Relaxed)
    }
}

/// One servo: immutable configuration plus runtime state.
#[derive(Debug)]
pub struct Actuator {
    config: Arc<ActuatorConfig>,
    target: TargetBinding,
    state: Arc<RuntimeState>,
}

impl Actuator {
    /// Create an actuator at angle 0 with the configured initial duty.
    ///
    /// Without a target cell the actuator is unbound and its worker never
    /// moves it.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if the configuration is invalid.
    pub fn new(config: ActuatorConfig, target: Option<TargetCell>) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = RuntimeState::new(config.initial_duty());
        Ok(Self {
            config: Arc::new(config),
            target: TargetBinding::from_cell(target),
            state: Arc::new(state),
        })
    }

    /// Actuator identifier.
    pub fn id(&self) -> u8 {
        self.config.id
    }

    /// Immutable configuration.
    pub fn config(&self) -> &ActuatorConfig {
        &self.config
    }

    /// Current target binding.
    pub fn target(&self) -> &TargetBinding {
        &self.target
    }

    /// Bind a caller-owned target cell.
    pub fn set_target(&mut self, cell: TargetCell) {
        self.target = TargetBinding::Bound(cell);
    }

    /// Drop the target cell; the actuator falls back to the sentinel.
    pub fn unset_target(&mut self) {
        self.target = TargetBinding::Unbound;
        self.state.record_target(0.0);
    }

    /// Last angle reached, in the actuator's own (possibly mirrored) space.
    pub fn current_angle(&self) -> f32 {
        self.state.angle()
    }

    /// Last duty commanded. A failed PWM write still advances it, so after
    /// a faulted sweep it may differ from the output.
    pub fn current_duty(&self) -> u32 {
        self.state.duty()
    }

    /// True once a stop was requested and not yet cleared by a launch.
    pub fn is_canceled(&self) -> bool {
        self.state.is_canceled()
    }

    /// Non-blocking view for status queries from other threads.
    pub fn monitor(&self) -> ActuatorMonitor {
        ActuatorMonitor {
            config: Arc::clone(&self.config),
            target: self.target.clone(),
            state: Arc::clone(&self.state),
        }
    }

    /// Status snapshot.
    pub fn status(&self) -> ActuatorStatus {
        ActuatorStatus::capture(&self.config, &self.target, &self.state)
    }

    pub(crate) fn state(&self) -> &RuntimeState {
        &self.state
    }
}

/// Cloneable read-only view of a (possibly running) actuator.
#[derive(Debug, Clone)]
pub struct ActuatorMonitor {
    config: Arc<ActuatorConfig>,
    target: TargetBinding,
    state: Arc<RuntimeState>,
}

impl ActuatorMonitor {
    /// Actuator identifier.
    pub fn id(&self) -> u8 {
        self.config.id
    }

    /// Status snapshot. Never blocks.
    pub fn status(&self) -> ActuatorStatus {
        ActuatorStatus::capture(&self.config, &self.target, &self.state)
    }

    /// Ask the worker to stop at its next poll point.
    pub fn request_stop(&self) {
        self.state.set_canceled(true);
    }
}

/// Point-in-time status of one actuator.
///
/// `Display` renders the human-readable one-liner; `Serialize` feeds JSON
/// logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActuatorStatus {
    /// Actuator identifier.
    pub id: u8,
    /// Configured sweep period [ms].
    pub sweep_period_ms: u32,
    /// Target snapshot read in the latest control cycle (0.0 before the
    /// first read and when unbound).
    pub target: f32,
    /// Whether a target cell is bound.
    pub bound: bool,
    /// Last angle reached [deg].
    pub angle: f32,
    /// Last duty commanded.
    pub duty: u32,
    /// Mirrored mounting.
    pub reversed: bool,
    /// Stop requested.
    pub canceled: bool,
    /// Completed sweeps.
    pub sweeps: u64,
    /// Failed PWM writes.
    pub pwm_errors: u64,
}

impl ActuatorStatus {
    fn capture(config: &ActuatorConfig, target: &TargetBinding, state: &RuntimeState) -> Self {
        Self {
            id: config.id,
            sweep_period_ms: config.sweep_period_ms,
            target: state.last_target(),
            bound: target.is_bound(),
            angle: state.angle(),
            duty: state.duty(),
            reversed: config.reversed,
            canceled: state.is_canceled(),
            sweeps: state.sweeps(),
            pwm_errors: state.pwm_errors(),
        }
    }
}

impl fmt::Display for ActuatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "servo {}: sweep period = {} ms, target = {:.2} deg, angle = {:.2} deg, reversed = {}, status = {}",
            self.id,
            self.sweep_period_ms,
            self.target,
            self.angle,
            self.reversed,
            if self.canceled { "canceled" } else { "active" },
        )
    }
}
