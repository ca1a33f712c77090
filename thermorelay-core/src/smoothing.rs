//! Sliding-window sample smoothing
//!
//! Keeps the most recent raw ADC counts in a fixed-capacity ring and
//! reports their arithmetic mean.

use core::fmt;

use heapless::Deque;

use crate::config::ConfigError;

/// Largest supported sample window
pub const MAX_WINDOW: usize = 64;

/// No samples have been pushed yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoData;

impl fmt::Display for NoData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no analog reading available")
    }
}

/// Bounded window of raw analog samples
///
/// Pushing past capacity evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct SampleSmoother {
    samples: Deque<u16, MAX_WINDOW>,
    capacity: usize,
}

impl SampleSmoother {
    /// Create a smoother retaining the last `capacity` samples
    ///
    /// `capacity` must be in `1..=MAX_WINDOW`.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 || capacity > MAX_WINDOW {
            return Err(ConfigError::InvalidWindow { size: capacity });
        }

        Ok(Self {
            samples: Deque::new(),
            capacity,
        })
    }

    /// Append a sample, evicting the oldest one if the window is full
    pub fn push(&mut self, sample: u16) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        // Cannot fail: len < capacity <= MAX_WINDOW
        let _ = self.samples.push_back(sample);
    }

    /// Mean of the retained samples
    pub fn average(&self) -> Result<f32, NoData> {
        if self.samples.is_empty() {
            return Err(NoData);
        }

        let sum: u32 = self.samples.iter().map(|&s| s as u32).sum();
        Ok(sum as f32 / self.samples.len() as f32)
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Configured window size
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all retained samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_window_evicts_oldest() {
        let mut smoother = SampleSmoother::new(3).unwrap();
        for sample in [10, 20, 30, 40] {
            smoother.push(sample);
        }
        assert_eq!(smoother.len(), 3);
        assert_eq!(smoother.average(), Ok(30.0));
    }

    #[test]
    fn test_partial_window() {
        let mut smoother = SampleSmoother::new(4).unwrap();
        smoother.push(100);
        smoother.push(201);
        assert_eq!(smoother.average(), Ok(150.5));
    }

    #[test]
    fn test_empty_has_no_data() {
        let mut smoother = SampleSmoother::new(2).unwrap();
        assert_eq!(smoother.average(), Err(NoData));

        smoother.push(7);
        smoother.clear();
        assert!(smoother.is_empty());
        assert_eq!(smoother.average(), Err(NoData));
    }

    #[test]
    fn test_capacity_bounds() {
        assert_eq!(
            SampleSmoother::new(0).unwrap_err(),
            ConfigError::InvalidWindow { size: 0 }
        );
        assert!(SampleSmoother::new(MAX_WINDOW + 1).is_err());
        assert_eq!(SampleSmoother::new(MAX_WINDOW).unwrap().capacity(), MAX_WINDOW);
    }

    #[test]
    fn test_full_scale_samples_do_not_overflow() {
        let mut smoother = SampleSmoother::new(MAX_WINDOW).unwrap();
        for _ in 0..MAX_WINDOW * 2 {
            smoother.push(u16::MAX);
        }
        assert_eq!(smoother.average(), Ok(u16::MAX as f32));
    }

    proptest! {
        #[test]
        fn prop_average_is_mean_of_tail(
            capacity in 1usize..=MAX_WINDOW,
            samples in proptest::collection::vec(0u16..1024, 1..200),
        ) {
            let mut smoother = SampleSmoother::new(capacity).unwrap();
            for &s in &samples {
                smoother.push(s);
            }

            let tail = &samples[samples.len().saturating_sub(capacity)..];
            let expected = tail.iter().map(|&s| s as f64).sum::<f64>() / tail.len() as f64;
            let average = smoother.average().unwrap() as f64;
            prop_assert!((average - expected).abs() < 1e-3);
        }
    }
}
