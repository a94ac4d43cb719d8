//! Adaptive unit-time estimate

use crate::config::TimingConfig;
use crate::error::MorseError;
use crate::types::{unit_ms_to_wpm, Element};
use portable_atomic::{AtomicU32, Ordering};

/// Outcome of feeding one classified element to the model
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Observation {
    /// Estimate updated
    Accepted { unit_ms: f32 },
    /// Treated as keying noise, estimate unchanged
    Rejected { implied_unit_ms: f32 },
}

/// Rolling estimate of one dit's duration.
///
/// Exponential moving average over the unit time implied by each element
/// (a dah implies a third of its length). Observations that would move the
/// estimate by more than `max_step_ratio` in one step are dropped.
#[derive(Clone, Debug)]
pub struct TimingModel {
    unit_ms: f32,
    config: TimingConfig,
    accepted: u32,
    rejected: u32,
}

impl TimingModel {
    pub fn new(config: TimingConfig) -> Result<Self, MorseError> {
        config.validate()?;
        Ok(Self {
            unit_ms: config.initial_unit_ms,
            config,
            accepted: 0,
            rejected: 0,
        })
    }

    /// Update from an element the decoder has just classified
    pub fn observe(&mut self, duration_ms: f32, classified_as: Element) -> Observation {
        let implied_unit_ms = duration_ms / classified_as.duration_units() as f32;
        let ratio = self.config.max_step_ratio;

        // NaN fails both comparisons and lands here too
        if !(implied_unit_ms >= self.unit_ms / ratio && implied_unit_ms <= self.unit_ms * ratio) {
            self.rejected = self.rejected.saturating_add(1);
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "timing: ignored {=f32}ms {} (implies {=f32}ms, estimate {=f32}ms)",
                duration_ms,
                classified_as,
                implied_unit_ms,
                self.unit_ms
            );
            return Observation::Rejected { implied_unit_ms };
        }

        let alpha = self.config.smoothing;
        let updated = self.unit_ms + alpha * (implied_unit_ms - self.unit_ms);
        self.unit_ms = clamp(updated, self.config.min_unit_ms, self.config.max_unit_ms);
        self.accepted = self.accepted.saturating_add(1);

        #[cfg(feature = "defmt")]
        defmt::trace!("timing: unit {=f32}ms", self.unit_ms);

        Observation::Accepted {
            unit_ms: self.unit_ms,
        }
    }

    /// Current unit time in milliseconds, always > 0
    pub fn unit_ms(&self) -> f32 {
        self.unit_ms
    }

    /// Current speed (PARIS, 50 units per word)
    pub fn current_wpm(&self) -> f32 {
        unit_ms_to_wpm(self.unit_ms)
    }

    /// Restore a saved estimate
    pub fn set_unit_ms(&mut self, unit_ms: f32) -> Result<(), MorseError> {
        if !(unit_ms >= self.config.min_unit_ms && unit_ms <= self.config.max_unit_ms) {
            return Err(MorseError::InvalidConfig("unit time outside configured bounds"));
        }
        self.unit_ms = unit_ms;
        Ok(())
    }

    /// Return to the configured seed
    pub fn reset(&mut self) {
        self.unit_ms = self.config.initial_unit_ms;
        self.accepted = 0;
        self.rejected = 0;
    }

    /// (accepted, rejected) observation counts
    pub fn observation_counts(&self) -> (u32, u32) {
        (self.accepted, self.rejected)
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }
}

fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Unit-time snapshot shared with tasks that only read it.
///
/// The session publishes after each event; an encoder on another task takes
/// one reading per `encode_text` call.
pub struct SharedUnitTime {
    bits: AtomicU32,
}

impl SharedUnitTime {
    pub const fn new(unit_ms: f32) -> Self {
        Self {
            bits: AtomicU32::new(unit_ms.to_bits()),
        }
    }

    pub fn publish(&self, unit_ms: f32) {
        self.bits.store(unit_ms.to_bits(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}
