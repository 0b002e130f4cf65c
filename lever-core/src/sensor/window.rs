//! Fixed-size history of raw samples

use heapless::HistoryBuffer;

/// The last `N` raw samples
///
/// Samples are stored as read, including out-of-range values; deciding
/// whether a reading is plausible is the error monitor's job.
#[derive(Debug, Clone)]
pub struct SampleWindow<const N: usize> {
    samples: HistoryBuffer<i16, N>,
}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleWindow<N> {
    /// Create an empty window
    pub const fn new() -> Self {
        Self {
            samples: HistoryBuffer::new(),
        }
    }

    /// Append a sample, evicting the oldest once full
    pub fn push(&mut self, raw: i16) {
        self.samples.write(raw);
    }

    /// Stored samples, in no particular order
    ///
    /// Suitable for order-independent checks such as
    /// [`ErrorMonitor::check_sensor_error`](crate::error::ErrorMonitor::check_sensor_error).
    pub fn as_slice(&self) -> &[i16] {
        self.samples.as_slice()
    }

    /// Stored samples from oldest to newest
    pub fn iter_ordered(&self) -> impl Iterator<Item = &i16> + '_ {
        self.samples.oldest_ordered()
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<i16> {
        self.samples.recent().copied()
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample has been stored
    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }

    /// Whether the window holds `N` samples
    pub fn is_full(&self) -> bool {
        self.samples.len() == N
    }

    /// Window capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Mean of the stored samples, rounded half up
    pub fn smoothed(&self) -> Option<i16> {
        let len = self.samples.len() as i32;
        if len == 0 {
            return None;
        }

        let sum: i32 = self.samples.as_slice().iter().map(|&s| s as i32).sum();
        Some((2 * sum + len).div_euclid(2 * len) as i16)
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_and_evicts() {
        let mut window = SampleWindow::<3>::new();
        assert!(window.is_empty());
        assert_eq!(window.smoothed(), None);

        window.push(10);
        window.push(20);
        assert_eq!(window.len(), 2);
        assert!(!window.is_full());

        window.push(30);
        window.push(40);
        assert!(window.is_full());
        assert_eq!(window.latest(), Some(40));

        let ordered: heapless::Vec<i16, 3> = window.iter_ordered().copied().collect();
        assert_eq!(ordered.as_slice(), &[20, 30, 40]);
    }

    #[test]
    fn test_smoothed_rounds_half_up() {
        let mut window = SampleWindow::<4>::new();
        window.push(100);
        window.push(101);
        assert_eq!(window.smoothed(), Some(101)); // 100.5

        window.push(100);
        assert_eq!(window.smoothed(), Some(100)); // 100.33
    }

    #[test]
    fn test_smoothed_with_negative_samples() {
        let mut window = SampleWindow::<2>::new();
        window.push(-3);
        window.push(0);
        assert_eq!(window.smoothed(), Some(-1)); // -1.5 rounds up to -1
    }

    #[test]
    fn test_clear() {
        let mut window = SampleWindow::<2>::new();
        window.push(5);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.latest(), None);
    }
}
