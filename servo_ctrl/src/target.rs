//! Shared target cell.
//!
//! A `TargetCell` is the only state touched by more than one thread: the
//! caller stores angles at its own cadence, the actuator worker loads one
//! snapshot per control cycle. The value is an `f32` kept as raw bits in an
//! `AtomicU32`, so a read is never torn and no lock is involved. Staleness
//! is accepted: writes landing during a sweep are only seen on the next
//! cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Caller-owned atomic angle in degrees.
///
/// Cloning yields another handle to the same cell.
#[derive(Debug, Clone)]
pub struct TargetCell {
    bits: Arc<AtomicU32>,
}

impl TargetCell {
    /// Create a cell holding `angle`.
    pub fn new(angle: f32) -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(angle.to_bits())),
        }
    }

    /// Publish a new target angle.
    #[inline]
    pub fn store(&self, angle: f32) {
        self.bits.store(angle.to_bits(), Ordering::Release);
    }

    /// Read the current target angle.
    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// True if both handles point at the same cell.
    pub fn same_cell(&self, other: &TargetCell) -> bool {
        Arc::ptr_eq(&self.bits, &other.bits)
    }
}

impl Default for TargetCell {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Where an actuator reads its target from.
#[derive(Debug, Clone, Default)]
pub enum TargetBinding {
    /// Caller-owned cell.
    Bound(TargetCell),
    /// No cell bound; reads as the 0.0 sentinel and never causes motion.
    #[default]
    Unbound,
}

impl TargetBinding {
    /// Build a binding from an optional cell.
    pub fn from_cell(cell: Option<TargetCell>) -> Self {
        match cell {
            Some(cell) => Self::Bound(cell),
            None => Self::Unbound,
        }
    }

    /// One snapshot for a control cycle, or `None` when unbound.
    #[inline]
    pub fn snapshot(&self) -> Option<f32> {
        match self {
            Self::Bound(cell) => Some(cell.load()),
            Self::Unbound => None,
        }
    }

    /// True if a caller-owned cell is bound.
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }
}
