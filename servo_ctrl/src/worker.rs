//! Per-actuator control loop.
//!
//! One worker thread per actuator. Each control cycle:
//!
//! 1. Exit if a stop was requested.
//! 2. Read the target cell once (unbound actuators skip to rest).
//! 3. Plan a sweep; a no-op plan skips to rest.
//! 4. Write every duty step to the PWM port, sleeping `duty_update_period`
//!    after each. The stop flag is not looked at while a sweep runs, so a
//!    started sweep always completes.
//! 5. Record the exact target angle, exit if a stop arrived meanwhile,
//!    otherwise sleep `rest_period` and loop.
//!
//! The worker owns its `Actuator` by value and hands it back on join.

use crate::actuator::{Actuator, ActuatorMonitor};
use crate::fleet::FleetError;
use crate::trajectory::{self, Sweep};
use servo_common::pwm::PwmOutput;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, trace, warn};

/// Handle to a running control loop.
#[derive(Debug)]
pub struct Worker {
    monitor: ActuatorMonitor,
    handle: JoinHandle<Actuator>,
}

impl Worker {
    /// Clear the cancel flag and launch the control loop on its own thread.
    ///
    /// The flag is cleared before the thread exists, so a stop requested
    /// right after this call returns is never lost.
    ///
    /// # Errors
    /// Returns `FleetError::Spawn` if the OS refuses a new thread.
    pub fn spawn(actuator: Actuator, port: Arc<dyn PwmOutput>) -> Result<Self, FleetError> {
        actuator.state().set_canceled(false);
        let monitor = actuator.monitor();
        let id = actuator.id();

        let handle = thread::Builder::new()
            .name(format!("servo-{id}"))
            .spawn(move || run(actuator, port.as_ref()))
            .map_err(|source| FleetError::Spawn { id, source })?;

        Ok(Self { monitor, handle })
    }

    /// Actuator identifier.
    pub fn id(&self) -> u8 {
        self.monitor.id()
    }

    /// Read-only view of the actuator driven by this worker.
    pub fn monitor(&self) -> &ActuatorMonitor {
        &self.monitor
    }

    /// Ask the loop to exit at its next poll point. Does not block.
    pub fn request_stop(&self) {
        self.monitor.request_stop();
    }

    /// True once the loop has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the loop exits and take the actuator back.
    ///
    /// # Errors
    /// Returns `FleetError::WorkerPanicked` if the loop panicked (only
    /// possible through a panicking PWM backend).
    pub fn join(self) -> Result<Actuator, FleetError> {
        let id = self.id();
        self.handle
            .join()
            .map_err(|_| FleetError::WorkerPanicked(id))
    }

    /// `request_stop()` followed by `join()`.
    pub fn stop(self) -> Result<Actuator, FleetError> {
        self.request_stop();
        self.join()
    }
}

/// The control loop. Returns the actuator once a stop was observed.
pub fn run(actuator: Actuator, port: &dyn PwmOutput) -> Actuator {
    let config = actuator.config();
    let state = actuator.state();
    let rest_period = config.rest_period();

    info!(
        id = config.id,
        channel = config.channel,
        bound = actuator.target().is_bound(),
        angle = state.angle(),
        "Worker started"
    );

    loop {
        if state.is_canceled() {
            break;
        }

        if let Some(snapshot) = actuator.target().snapshot() {
            state.record_target(snapshot);
            match trajectory::plan(config, state.angle(), snapshot) {
                Some(sweep) => {
                    execute_sweep(&actuator, port, &sweep);
                    if state.is_canceled() {
                        break;
                    }
                }
                None => trace!(id = config.id, snapshot, angle = state.angle(), "No motion"),
            }
        }

        thread::sleep(rest_period);
    }

    info!(
        id = config.id,
        angle = state.angle(),
        duty = state.duty(),
        "Worker stopped"
    );
    actuator
}

/// Drive one sweep to completion and record the reached angle.
fn execute_sweep(actuator: &Actuator, port: &dyn PwmOutput, sweep: &Sweep) {
    let config = actuator.config();
    let state = actuator.state();
    let step_period = config.duty_update_period();

    debug!(
        id = config.id,
        from = state.angle(),
        to = sweep.target_angle,
        increment = sweep.increment,
        steps = sweep.steps,
        "Sweep started"
    );

    for duty in sweep.duties(state.duty(), config.duty_window()) {
        if let Err(e) = port.write(config.channel, duty) {
            let errors = state.record_pwm_error();
            if errors <= 10 || errors % 1000 == 0 {
                warn!(id = config.id, channel = config.channel, "PWM write #{errors} failed: {e}");
            }
        }
        state.set_duty(duty);
        trace!(id = config.id, duty, "Duty step");
        thread::sleep(step_period);
    }

    state.set_angle(sweep.target_angle);
    state.record_sweep();

    debug!(
        id = config.id,
        angle = sweep.target_angle,
        duty = state.duty(),
        "Sweep complete"
    );
}
