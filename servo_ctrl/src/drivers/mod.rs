//! PWM output port implementations.
//!
//! This module contains all PWM backends:
//!
//! - [`simulation`] - In-memory backend for development and testing
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `PwmOutput` trait from `servo_common::pwm`
//! 3. Register the backend in [`register_builtin_drivers`]

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register every built-in PWM backend.
pub fn register_builtin_drivers(registry: &mut DriverRegistry) {
    registry.register(simulation::DRIVER_NAME, simulation::create_driver);
}
