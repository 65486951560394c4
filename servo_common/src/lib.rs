//! Servo Common Library
//!
//! This crate provides shared constants, configuration loading utilities and
//! the PWM output port contract for all servo fleet workspace crates.
//!
//! # Module Structure
//!
//! - [`actuator`] - Per-actuator and fleet configuration with validation
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide constants and defaults
//! - [`pwm`] - PWM output port trait and error types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use servo_common::prelude::*;
//!
//! let config = ActuatorConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.step_count(), 75);
//! ```

pub mod actuator;
pub mod config;
pub mod consts;
pub mod prelude;
pub mod pwm;
