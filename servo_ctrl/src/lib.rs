//! # Servo Control Library
//!
//! Drives a fleet of independent servos from externally written target
//! angles. Each actuator gets its own worker thread that polls a shared
//! target cell, plans a fixed-length sweep and steps the PWM duty towards
//! the new angle; the fleet manager starts, stops (graceful join) and
//! resumes those workers without losing actuator position.
//!
//! # Module Structure
//!
//! - [`target`] - Lock-free shared target cell and its binding
//! - [`actuator`] - Actuator configuration + runtime state, status snapshots
//! - [`trajectory`] - Pure sweep planning (dead-band, reversal, duty steps)
//! - [`worker`] - Per-actuator control loop
//! - [`fleet`] - Fleet binding: start, stop, resume
//! - [`driver_registry`] - PWM backend factory registration
//! - [`drivers`] - PWM backend implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  store()   ┌──────────────┐
//! │ caller code  │──────────► │  TargetCell  │ (AtomicU32, f32 bits)
//! └──────┬───────┘            └──────┬───────┘
//!        │ start/stop/resume         │ load() once per cycle
//!        ▼                           ▼
//! ┌──────────────┐  spawn    ┌──────────────┐  plan()  ┌──────────────┐
//! │ FleetBinding │─────────► │    Worker    │────────► │  trajectory  │
//! └──────────────┘  join     └──────┬───────┘          └──────────────┘
//!                                   │ set_duty + commit per step
//!                                   ▼
//!                           ┌──────────────┐
//!                           │  PwmOutput   │ (trait object)
//!                           └──────────────┘
//! ```

#![deny(missing_docs)]

pub mod actuator;
pub mod driver_registry;
pub mod drivers;
pub mod fleet;
pub mod target;
pub mod trajectory;
pub mod worker;

// Re-export key types for convenience
pub use crate::actuator::{Actuator, ActuatorMonitor, ActuatorStatus};
pub use crate::driver_registry::DriverRegistry;
pub use crate::fleet::{FleetBinding, FleetError, prepare_channels};
pub use crate::target::{TargetBinding, TargetCell};
