//! Fleet lifecycle: start, stop, resume.
//!
//! A `FleetBinding` keeps every actuator paired with its worker, so callers
//! never track threads themselves. Actuators move into their workers while
//! running and come back on stop; resume launches fresh workers on the same
//! actuators, so angle and duty survive a stop/resume cycle.
//!
//! # Usage
//!
//! ```rust,no_run
//! use servo_ctrl::drivers::simulation::SimulatedPwm;
//! use servo_ctrl::{prepare_channels, Actuator, FleetBinding, TargetCell};
//! use servo_common::actuator::ActuatorConfig;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), servo_ctrl::FleetError> {
//! let port = Arc::new(SimulatedPwm::new());
//! let target = TargetCell::default();
//! let actuators = vec![Actuator::new(ActuatorConfig::default(), Some(target.clone()))?];
//!
//! prepare_channels(port.as_ref(), &actuators)?;
//! let mut fleet = FleetBinding::start(actuators, port)?;
//! target.store(90.0);
//! // ... later, e.g. before a light sleep
//! fleet.stop();
//! fleet.resume()?;
//! # Ok(())
//! # }
//! ```

use crate::actuator::{Actuator, ActuatorMonitor, ActuatorStatus};
use crate::worker::Worker;
use servo_common::config::ConfigError;
use servo_common::pwm::{ChannelSetup, PwmError, PwmOutput};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Error types for fleet operations.
#[derive(Debug, Error)]
pub enum FleetError {
    /// Resume requested while a worker is still running.
    #[error("Actuator {0} is still running; stop the fleet before resuming")]
    AlreadyRunning(u8),

    /// The OS refused a worker thread.
    #[error("Failed to spawn worker for actuator {id}: {source}")]
    Spawn {
        /// Actuator whose worker could not start.
        id: u8,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked; its actuator state is no longer owned.
    #[error("Worker for actuator {0} panicked")]
    WorkerPanicked(u8),

    /// PWM port error during channel preparation.
    #[error(transparent)]
    Pwm(#[from] PwmError),

    /// Invalid actuator configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One actuator/worker pair.
enum Slot {
    /// Stopped; the binding owns the actuator.
    Idle(Actuator),
    /// Running; the worker owns the actuator.
    Running(Worker),
    /// Worker failed to start or panicked. Only status queries remain.
    Lost(ActuatorMonitor),
    /// Placeholder during a transition, never observable outside a method.
    Vacant,
}

impl Slot {
    fn status(&self) -> Option<ActuatorStatus> {
        match self {
            Slot::Idle(actuator) => Some(actuator.status()),
            Slot::Running(worker) => Some(worker.monitor().status()),
            Slot::Lost(monitor) => Some(monitor.status()),
            Slot::Vacant => None,
        }
    }

    fn monitor(&self) -> Option<ActuatorMonitor> {
        match self {
            Slot::Idle(actuator) => Some(actuator.monitor()),
            Slot::Running(worker) => Some(worker.monitor().clone()),
            Slot::Lost(monitor) => Some(monitor.clone()),
            Slot::Vacant => None,
        }
    }
}

/// Ordered set of actuators bound to their workers.
///
/// Dropping the binding stops and joins every worker.
pub struct FleetBinding {
    slots: Vec<Slot>,
    port: Arc<dyn PwmOutput>,
}

impl FleetBinding {
    /// Launch one worker per actuator, in order.
    ///
    /// Precondition: every actuator's PWM channel is configured (see
    /// [`prepare_channels`]).
    ///
    /// # Errors
    /// Returns `FleetError::Spawn` if a worker cannot be launched; workers
    /// already launched are stopped when the partial binding is dropped.
    pub fn start(actuators: Vec<Actuator>, port: Arc<dyn PwmOutput>) -> Result<Self, FleetError> {
        let mut binding = Self {
            slots: actuators.into_iter().map(Slot::Idle).collect(),
            port,
        };
        binding.launch_idle()?;
        info!(
            "Fleet started: {} workers on PWM port '{}'",
            binding.running_count(),
            binding.port.name()
        );
        Ok(binding)
    }

    /// Request every worker to stop, then wait for all of them.
    ///
    /// In-flight sweeps finish first, so this blocks for at most one sweep
    /// period plus one rest period of the slowest actuator. Safe to call
    /// repeatedly.
    pub fn stop(&mut self) {
        for slot in &self.slots {
            if let Slot::Running(worker) = slot {
                worker.request_stop();
            }
        }

        let mut joined = 0usize;
        for slot in &mut self.slots {
            *slot = match std::mem::replace(slot, Slot::Vacant) {
                Slot::Running(worker) => {
                    let monitor = worker.monitor().clone();
                    match worker.join() {
                        Ok(actuator) => {
                            joined += 1;
                            Slot::Idle(actuator)
                        }
                        Err(e) => {
                            error!("{e}");
                            Slot::Lost(monitor)
                        }
                    }
                }
                other => other,
            };
        }

        if joined > 0 {
            info!("Fleet stopped: {joined} workers joined");
        }
    }

    /// Relaunch workers on the stopped actuators, keeping angle and duty.
    ///
    /// # Errors
    /// Returns `FleetError::AlreadyRunning` (and changes nothing) if any
    /// worker is still running.
    pub fn resume(&mut self) -> Result<(), FleetError> {
        if let Some(id) = self.slots.iter().find_map(|slot| match slot {
            Slot::Running(worker) => Some(worker.id()),
            _ => None,
        }) {
            warn!("Resume rejected: actuator {id} still running");
            return Err(FleetError::AlreadyRunning(id));
        }

        self.launch_idle()?;
        info!("Fleet resumed: {} workers", self.running_count());
        Ok(())
    }

    /// Number of actuators in the binding.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if the binding holds no actuator.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of workers currently running.
    pub fn running_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Running(_)))
            .count()
    }

    /// True if any worker is running.
    pub fn is_running(&self) -> bool {
        self.running_count() > 0
    }

    /// Status of the actuator at `index`.
    pub fn status(&self, index: usize) -> Option<ActuatorStatus> {
        self.slots.get(index).and_then(Slot::status)
    }

    /// Status of every actuator, in order.
    pub fn statuses(&self) -> Vec<ActuatorStatus> {
        self.slots.iter().filter_map(Slot::status).collect()
    }

    /// Cloneable views for status queries from other threads.
    pub fn monitors(&self) -> Vec<ActuatorMonitor> {
        self.slots.iter().filter_map(Slot::monitor).collect()
    }

    /// The stopped actuator at `index`; `None` while its worker runs.
    pub fn actuator(&self, index: usize) -> Option<&Actuator> {
        match self.slots.get(index) {
            Some(Slot::Idle(actuator)) => Some(actuator),
            _ => None,
        }
    }

    /// Mutable access to a stopped actuator, e.g. to rebind its target.
    ///
    /// `None` while its worker runs.
    pub fn actuator_mut(&mut self, index: usize) -> Option<&mut Actuator> {
        match self.slots.get_mut(index) {
            Some(Slot::Idle(actuator)) => Some(actuator),
            _ => None,
        }
    }

    /// Stop the fleet and hand the actuators back.
    ///
    /// Actuators whose worker panicked are not returned.
    pub fn into_actuators(mut self) -> Vec<Actuator> {
        self.stop();
        std::mem::take(&mut self.slots)
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Idle(actuator) => Some(actuator),
                _ => None,
            })
            .collect()
    }

    fn launch_idle(&mut self) -> Result<(), FleetError> {
        for slot in &mut self.slots {
            *slot = match std::mem::replace(slot, Slot::Vacant) {
                Slot::Idle(actuator) => {
                    let monitor = actuator.monitor();
                    match Worker::spawn(actuator, Arc::clone(&self.port)) {
                        Ok(worker) => Slot::Running(worker),
                        Err(e) => {
                            *slot = Slot::Lost(monitor);
                            return Err(e);
                        }
                    }
                }
                Slot::Lost(monitor) => {
                    warn!("Actuator {} lost, not relaunched", monitor.id());
                    Slot::Lost(monitor)
                }
                other => other,
            };
        }
        Ok(())
    }
}

impl Drop for FleetBinding {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}

/// Configure the PWM channel of every actuator and emit its initial duty.
///
/// Call once before [`FleetBinding::start`].
pub fn prepare_channels(port: &dyn PwmOutput, actuators: &[Actuator]) -> Result<(), FleetError> {
    for actuator in actuators {
        let setup = ChannelSetup::from(actuator.config());
        port.configure(&setup)?;
        info!(
            "Prepared channel {} (timer {}, gpio {}) for actuator {}: {} bits @ {} Hz, duty {}",
            setup.channel,
            setup.timer,
            setup.gpio,
            actuator.id(),
            setup.resolution_bits,
            setup.frequency_hz,
            setup.initial_duty
        );
    }
    Ok(())
}
