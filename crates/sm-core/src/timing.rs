//! Step timing for reel animation

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MachineError, MachineResult};

/// Timing of the per-symbol step animation
///
/// Every reel draws one speed per pull; all of its symbols then step with
/// the same duration `base_step_ms + U[0,1) * speed_jitter_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTiming {
    /// Minimum duration of one single-symbol step (ms)
    pub base_step_ms: f64,

    /// Random extra duration added per reel (ms, exclusive upper bound)
    pub speed_jitter_ms: f64,

    /// Frame rate of the win highlight animation
    pub highlight_fps: f64,
}

impl StepTiming {
    /// Timing of the original browser build
    pub fn legacy() -> Self {
        Self {
            base_step_ms: 20.0,
            speed_jitter_ms: 100.0,
            highlight_fps: 6.0,
        }
    }

    /// Draw the step duration for one reel
    pub fn sample_step_ms<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.base_step_ms + rng.random::<f64>() * self.speed_jitter_ms
    }

    pub fn validate(&self) -> MachineResult<()> {
        let fields = [
            ("base_step_ms", self.base_step_ms),
            ("speed_jitter_ms", self.speed_jitter_ms),
            ("highlight_fps", self.highlight_fps),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(MachineError::InvalidTiming(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for StepTiming {
    fn default() -> Self {
        Self::legacy()
    }
}

/// Inclusive range of steps a reel travels per pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRange {
    pub min: u32,
    pub max: u32,
}

impl StepRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// `1..=58`, the range of the words build
    pub fn words() -> Self {
        Self::new(1, 58)
    }

    /// `0..=57`, the range of the second build; a reel may not move at all
    pub fn variant_b() -> Self {
        Self::new(0, 57)
    }

    pub fn contains(&self, steps: u32) -> bool {
        (self.min..=self.max).contains(&steps)
    }

    /// Draw a step count uniformly from the range
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.random_range(self.min..=self.max)
    }

    pub fn validate(&self) -> MachineResult<()> {
        if self.min > self.max {
            return Err(MachineError::InvalidStepRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl Default for StepRange {
    fn default() -> Self {
        Self::words()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_step_ms_within_bounds() {
        let timing = StepTiming::legacy();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..500 {
            let ms = timing.sample_step_ms(&mut rng);
            assert!((20.0..120.0).contains(&ms));
        }
    }

    #[test]
    fn test_step_range_sampling_is_inclusive() {
        let range = StepRange::new(0, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let s = range.sample(&mut rng);
            assert!(range.contains(s));
            seen[s as usize] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_variant_ranges() {
        assert!(!StepRange::words().contains(0));
        assert!(StepRange::words().contains(58));
        assert!(StepRange::variant_b().contains(0));
        assert!(!StepRange::variant_b().contains(58));
    }

    #[test]
    fn test_invalid_range_rejected() {
        assert!(matches!(
            StepRange::new(5, 2).validate(),
            Err(MachineError::InvalidStepRange { min: 5, max: 2 })
        ));
        assert!(StepRange::new(3, 3).validate().is_ok());
    }

    #[test]
    fn test_timing_validation() {
        assert!(StepTiming::legacy().validate().is_ok());
        let mut bad = StepTiming::legacy();
        bad.speed_jitter_ms = f64::NAN;
        assert!(bad.validate().is_err());
        bad.speed_jitter_ms = -1.0;
        assert!(bad.validate().is_err());
    }
}
