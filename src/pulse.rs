//! Pulse width measurement by loop counting.
//!
//! The protocol only needs to compare two pulses measured with the same loop,
//! so a pulse is reported as the number of polls the line spent at a level
//! rather than as a calibrated duration.

use embedded_hal::digital::PinState;

use crate::line::DataLine;

/// Default cycle budget: one millisecond worth of iterations at 16 MHz.
pub const DEFAULT_CYCLE_BUDGET: u32 = 16_000;

/// Result of waiting for the line to leave a level.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulseMeasurement {
    /// The level changed after this many polls.
    Cycles(u32),
    /// The level held for the whole cycle budget.
    Timeout,
}

impl PulseMeasurement {
    /// Poll count, or `None` on timeout.
    pub fn cycles(self) -> Option<u32> {
        match self {
            Self::Cycles(count) => Some(count),
            Self::Timeout => None,
        }
    }

    /// Poll count of a pulse that was actually observed.
    ///
    /// `None` on timeout and also for a zero count: the level had already
    /// changed on the first poll, so the edge that started the pulse was missed.
    pub fn width(self) -> Option<u32> {
        match self {
            Self::Cycles(0) | Self::Timeout => None,
            Self::Cycles(count) => Some(count),
        }
    }
}

/// Upper bound on polls spent waiting for a single level change.
///
/// Sized to about one millisecond: far longer than the protocol's longest pulse
/// (~80 µs), short enough to give up quickly on a disconnected line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleBudget(u32);

impl CycleBudget {
    /// A budget of exactly `cycles` polls (at least one).
    pub const fn new(cycles: u32) -> Self {
        CycleBudget(if cycles == 0 { 1 } else { cycles })
    }

    /// One millisecond worth of polls for a loop running at `rate_hz` iterations per second.
    pub const fn per_millisecond(rate_hz: u32) -> Self {
        Self::new(rate_hz / 1000)
    }

    /// Number of polls.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for CycleBudget {
    fn default() -> Self {
        CycleBudget(DEFAULT_CYCLE_BUDGET)
    }
}

/// Counts polls while the line stays at `level`.
///
/// Returns [`PulseMeasurement::Cycles`] with the number of polls that saw
/// `level` once the line changes, or [`PulseMeasurement::Timeout`] if it is
/// still at `level` after `budget` polls.
#[inline]
pub fn measure<L: DataLine>(
    line: &mut L,
    level: PinState,
    budget: CycleBudget,
) -> Result<PulseMeasurement, L::Error> {
    for count in 0..budget.get() {
        if line.read_level()? != level {
            return Ok(PulseMeasurement::Cycles(count));
        }
    }
    Ok(PulseMeasurement::Timeout)
}
