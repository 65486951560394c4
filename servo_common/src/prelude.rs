//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use servo_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use servo_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::actuator::{ActuatorConfig, FleetConfig};
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEAD_BAND_DEG, MAX_ACTUATORS};

// ─── PWM Output Port ────────────────────────────────────────────────
pub use crate::pwm::{ChannelSetup, PwmError, PwmFactory, PwmOutput};
