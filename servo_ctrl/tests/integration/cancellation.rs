//! Integration test: cancellation semantics.
//!
//! A stop never interrupts a sweep, is never lost right after a launch and
//! survives a panicking PWM backend.

use super::{fast_config, start_fleet, wait_for};
use servo_common::actuator::ActuatorConfig;
use servo_common::pwm::{ChannelSetup, PwmError, PwmOutput};
use servo_ctrl::{Actuator, FleetBinding, TargetCell};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

// ── Helpers ─────────────────────────────────────────────────────────

/// PWM port that panics on the first duty write.
#[derive(Default)]
struct PanickingPwm {
    hit: AtomicBool,
}

impl PwmOutput for PanickingPwm {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn version(&self) -> &'static str {
        "0.0.0"
    }

    fn configure(&self, _setup: &ChannelSetup) -> Result<(), PwmError> {
        Ok(())
    }

    fn set_duty(&self, channel: u8, _duty: u32) -> Result<(), PwmError> {
        self.hit.store(true, Ordering::SeqCst);
        panic!("backend failure on channel {channel}");
    }

    fn commit(&self, _channel: u8) -> Result<(), PwmError> {
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn stop_mid_sweep_completes_all_steps() {
    // 200 ms / 4 ms = 50 steps of 3276 / 50 = 65
    let config = ActuatorConfig {
        sweep_period_ms: 200,
        duty_update_period_ms: 4,
        ..fast_config(0)
    };
    let cell = TargetCell::new(180.0);
    let (mut fleet, port) = start_fleet(vec![config], &[Some(cell)]);
    wait_for("first duty step", || port.commit_count(0) >= 1);

    let started = Instant::now();
    fleet.stop();
    assert!(started.elapsed() < Duration::from_secs(2));

    assert_eq!(port.commit_count(0), 50);
    let status = fleet.status(0).unwrap();
    assert_eq!(status.angle, 180.0);
    assert_eq!(status.duty, 819 + 50 * 65);
    assert_eq!(status.sweeps, 1);
}

#[test]
fn stop_right_after_start_is_not_lost() {
    for _ in 0..20 {
        let (mut fleet, _port) = start_fleet(vec![fast_config(0)], &[None]);
        fleet.stop();
        assert!(!fleet.is_running());
        assert!(fleet.status(0).unwrap().canceled);
    }
}

#[test]
fn stop_right_after_resume_is_not_lost() {
    let (mut fleet, _port) = start_fleet(vec![fast_config(0), fast_config(1)], &[None, None]);
    for _ in 0..20 {
        fleet.stop();
        fleet.resume().unwrap();
    }
    fleet.stop();
    assert_eq!(fleet.running_count(), 0);
}

#[test]
fn resume_while_running_changes_nothing() {
    let (mut fleet, _port) = start_fleet(vec![fast_config(0), fast_config(1)], &[None, None]);
    assert!(fleet.resume().is_err());
    assert_eq!(fleet.running_count(), 2);
    fleet.stop();
    assert!(fleet.resume().is_ok());
    assert_eq!(fleet.running_count(), 2);
}

#[test]
fn panicking_backend_loses_the_worker() {
    let actuators = vec![Actuator::new(fast_config(0), Some(TargetCell::new(90.0))).unwrap()];
    let port = Arc::new(PanickingPwm::default());
    let mut fleet = FleetBinding::start(actuators, port.clone()).unwrap();
    wait_for("backend panic", || port.hit.load(Ordering::SeqCst));

    fleet.stop();
    assert_eq!(fleet.running_count(), 0);
    assert!(fleet.actuator(0).is_none());
    assert!(fleet.status(0).is_some());

    // Lost actuators are not relaunched.
    fleet.resume().unwrap();
    assert_eq!(fleet.running_count(), 0);
    assert!(fleet.into_actuators().is_empty());
}
