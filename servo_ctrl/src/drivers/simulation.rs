//! Simulation PWM backend.
//!
//! `SimulatedPwm` implements the `PwmOutput` trait in memory: it keeps the
//! configuration, staged and committed duty of every channel plus a bounded
//! history of committed values, so the control loop can run and be verified
//! without hardware. Faults can be injected per channel.

use parking_lot::Mutex;
use servo_common::pwm::{ChannelSetup, PwmError, PwmOutput};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

/// Registry name of this backend.
pub const DRIVER_NAME: &str = "simulation";

/// Channels available unless configured otherwise.
pub const DEFAULT_CHANNELS: u8 = 16;

/// Committed duty values kept per channel.
pub const HISTORY_LIMIT: usize = 4096;

/// Factory function to create a simulation backend instance.
pub fn create_driver() -> Arc<dyn PwmOutput> {
    Arc::new(SimulatedPwm::new())
}

/// Simulated state of one channel.
#[derive(Debug, Clone)]
struct ChannelState {
    setup: ChannelSetup,
    staged: u32,
    committed: u32,
    commits: u64,
    history: VecDeque<u32>,
    faulted: bool,
}

impl ChannelState {
    fn new(setup: ChannelSetup) -> Self {
        Self {
            setup,
            staged: setup.initial_duty,
            committed: setup.initial_duty,
            commits: 0,
            history: VecDeque::new(),
            faulted: false,
        }
    }
}

/// In-memory PWM output port.
#[derive(Debug)]
pub struct SimulatedPwm {
    channel_count: u8,
    channels: Mutex<HashMap<u8, ChannelState>>,
}

impl SimulatedPwm {
    /// Create a backend with [`DEFAULT_CHANNELS`] channels.
    pub fn new() -> Self {
        Self::with_channels(DEFAULT_CHANNELS)
    }

    /// Create a backend with `channel_count` channels.
    pub fn with_channels(channel_count: u8) -> Self {
        Self {
            channel_count,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// True if `configure()` was called for `channel`.
    pub fn is_configured(&self, channel: u8) -> bool {
        self.channels.lock().contains_key(&channel)
    }

    /// Setup applied to `channel`.
    pub fn setup(&self, channel: u8) -> Option<ChannelSetup> {
        self.channels.lock().get(&channel).map(|state| state.setup)
    }

    /// Duty currently on the output of `channel`.
    pub fn committed_duty(&self, channel: u8) -> Option<u32> {
        self.channels.lock().get(&channel).map(|state| state.committed)
    }

    /// Number of commits on `channel` since configuration.
    pub fn commit_count(&self, channel: u8) -> u64 {
        self.channels
            .lock()
            .get(&channel)
            .map_or(0, |state| state.commits)
    }

    /// Commits across all channels.
    pub fn total_commits(&self) -> u64 {
        self.channels.lock().values().map(|state| state.commits).sum()
    }

    /// Committed duty values of `channel`, oldest first.
    pub fn history(&self, channel: u8) -> Vec<u32> {
        self.channels
            .lock()
            .get(&channel)
            .map(|state| state.history.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Make every write to `channel` fail (or succeed again).
    pub fn set_fault(&self, channel: u8, faulted: bool) {
        if let Some(state) = self.channels.lock().get_mut(&channel) {
            state.faulted = faulted;
        }
    }
}

impl Default for SimulatedPwm {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmOutput for SimulatedPwm {
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn configure(&self, setup: &ChannelSetup) -> Result<(), PwmError> {
        if setup.channel >= self.channel_count {
            return Err(PwmError::InvalidChannel(setup.channel));
        }
        if setup.initial_duty > setup.max_duty() {
            return Err(PwmError::DutyOutOfRange {
                channel: setup.channel,
                duty: setup.initial_duty,
                max: setup.max_duty(),
            });
        }

        debug!(
            "Configured simulated channel {} (timer {}, gpio {}): {} bits @ {} Hz",
            setup.channel, setup.timer, setup.gpio, setup.resolution_bits, setup.frequency_hz
        );
        self.channels
            .lock()
            .insert(setup.channel, ChannelState::new(*setup));
        Ok(())
    }

    fn set_duty(&self, channel: u8, duty: u32) -> Result<(), PwmError> {
        let mut channels = self.channels.lock();
        let state = channels
            .get_mut(&channel)
            .ok_or(PwmError::NotConfigured(channel))?;
        if state.faulted {
            return Err(PwmError::Communication(format!(
                "injected fault on channel {channel}"
            )));
        }
        let max = state.setup.max_duty();
        if duty > max {
            return Err(PwmError::DutyOutOfRange { channel, duty, max });
        }
        state.staged = duty;
        Ok(())
    }

    fn commit(&self, channel: u8) -> Result<(), PwmError> {
        let mut channels = self.channels.lock();
        let state = channels
            .get_mut(&channel)
            .ok_or(PwmError::NotConfigured(channel))?;
        if state.faulted {
            return Err(PwmError::Communication(format!(
                "injected fault on channel {channel}"
            )));
        }
        state.committed = state.staged;
        state.commits += 1;
        if state.history.len() == HISTORY_LIMIT {
            state.history.pop_front();
        }
        state.history.push_back(state.committed);
        Ok(())
    }

    fn shutdown(&self) -> Result<(), PwmError> {
        let mut channels = self.channels.lock();
        info!(
            "Shutting down simulated PWM ({} channels, {} commits)",
            channels.len(),
            channels.values().map(|state| state.commits).sum::<u64>()
        );
        channels.clear();
        Ok(())
    }
}
