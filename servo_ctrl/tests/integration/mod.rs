//! Shared helpers for the integration tests.

mod cancellation;
mod demo_cli;
mod fleet_lifecycle;
mod targets;

use servo_common::actuator::ActuatorConfig;
use servo_ctrl::drivers::simulation::SimulatedPwm;
use servo_ctrl::{Actuator, FleetBinding, TargetCell, prepare_channels};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// 15-bit, 50 Hz, 5 steps of 2 ms per sweep, 2 ms rest.
pub fn fast_config(id: u8) -> ActuatorConfig {
    ActuatorConfig {
        id,
        channel: id,
        sweep_period_ms: 10,
        duty_update_period_ms: 2,
        rest_period_ms: 2,
        ..Default::default()
    }
}

/// Prepare channels and start a fleet with one target cell per config.
pub fn start_fleet(
    configs: Vec<ActuatorConfig>,
    targets: &[Option<TargetCell>],
) -> (FleetBinding, Arc<SimulatedPwm>) {
    let port = Arc::new(SimulatedPwm::new());
    let actuators: Vec<Actuator> = configs
        .into_iter()
        .zip(targets.iter().cloned())
        .map(|(config, target)| Actuator::new(config, target).unwrap())
        .collect();
    prepare_channels(port.as_ref(), &actuators).unwrap();
    let fleet = FleetBinding::start(actuators, port.clone()).unwrap();
    (fleet, port)
}

/// Poll `cond` every millisecond, failing after five seconds.
pub fn wait_for(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

/// Completed sweeps of the actuator at `index`.
pub fn sweeps(fleet: &FleetBinding, index: usize) -> u64 {
    fleet.status(index).map_or(0, |status| status.sweeps)
}
