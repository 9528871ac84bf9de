use crate::pulse::CycleBudget;

/// Minimum spacing between two reads, in milliseconds.
///
/// The sensor needs this long to take a new sample; reading faster returns
/// stale or corrupted data.
pub const MIN_INTERVAL_MS: u32 = 2000;

/// Driver settings.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Poll limit for a single pulse.
    pub cycle_budget: CycleBudget,
    /// Reads closer together than this are served from the last result.
    pub min_interval_ms: u32,
}

impl Config {
    /// Uses `budget` as the per-pulse poll limit.
    pub const fn with_cycle_budget(mut self, budget: CycleBudget) -> Self {
        self.cycle_budget = budget;
        self
    }

    /// Overrides the minimum spacing between reads.
    pub const fn with_min_interval_ms(mut self, interval_ms: u32) -> Self {
        self.min_interval_ms = interval_ms;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycle_budget: CycleBudget::default(),
            min_interval_ms: MIN_INTERVAL_MS,
        }
    }
}
