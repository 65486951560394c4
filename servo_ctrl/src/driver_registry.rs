//! Driver registry for PWM backends.
//!
//! Provides a `DriverRegistry` struct for registering and retrieving PWM
//! backend factories. Constructed at startup and passed around by value; no
//! global state.

use servo_common::pwm::{PwmError, PwmFactory, PwmOutput};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of available PWM backends.
pub struct DriverRegistry {
    factories: HashMap<&'static str, PwmFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in backend.
    pub fn with_builtin_drivers() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_builtin_drivers(&mut registry);
        registry
    }

    /// Register a backend factory.
    ///
    /// # Panics
    /// Panics if a backend with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: PwmFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a backend factory by name.
    pub fn get_factory(&self, name: &str) -> Option<PwmFactory> {
        self.factories.get(name).copied()
    }

    /// Create a backend instance by name.
    ///
    /// # Errors
    /// Returns `PwmError::Communication` if no backend with the given name
    /// is registered.
    pub fn create_driver(&self, name: &str) -> Result<Arc<dyn PwmOutput>, PwmError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| PwmError::Communication(format!("Driver not found: {name}")))?;
        Ok(factory())
    }

    /// List all registered backend names, sorted.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
