//! Bounded waveform history.

use std::collections::VecDeque;

/// Default number of retained samples per trace
pub const DEFAULT_WAVEFORM_CAPACITY: usize = 200;

/// Fixed-capacity sample history, newest first.
///
/// Pushing onto a full buffer evicts the oldest sample.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl WaveformBuffer {
    /// Create an empty buffer holding at most `capacity` samples (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a new sample at the front
    pub fn push(&mut self, sample: f64) {
        self.samples.push_front(sample);
        self.samples.truncate(self.capacity);
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<f64> {
        self.samples.front().copied()
    }

    /// Samples from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    /// Copy of the samples, newest first
    pub fn to_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for WaveformBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_WAVEFORM_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut buf = WaveformBuffer::new(3);
        buf.push(1.0);
        buf.push(2.0);
        assert_eq!(buf.to_vec(), vec![2.0, 1.0]);
        assert_eq!(buf.latest(), Some(2.0));
    }

    #[test]
    fn test_evicts_oldest() {
        let mut buf = WaveformBuffer::new(3);
        for i in 0..5 {
            buf.push(i as f64);
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.to_vec(), vec![4.0, 3.0, 2.0]);
    }

    #[test]
    fn test_default_capacity() {
        let mut buf = WaveformBuffer::default();
        for i in 0..500 {
            buf.push(i as f64);
        }
        assert_eq!(buf.len(), DEFAULT_WAVEFORM_CAPACITY);
        assert_eq!(buf.latest(), Some(499.0));
    }

    #[test]
    fn test_zero_capacity_is_promoted() {
        let buf = WaveformBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
    }
}
