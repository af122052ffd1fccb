use crate::{measure::Metric, summary::Summary};
use std::{collections::VecDeque, num::NonZeroUsize};

/// Fixed capacity sliding window over a [`Metric`]
///
/// Once the window is full, adding a value evicts the oldest one.
///
/// ```
/// # use linkstats_core::{measure::Ratio, summary::WindowedSummary};
/// # use std::num::NonZeroUsize;
/// let mut window = WindowedSummary::new(NonZeroUsize::new(2).unwrap());
/// window.add_value(Ratio::new(0.1).unwrap());
/// window.add_value(Ratio::new(0.2).unwrap());
/// window.add_value(Ratio::new(0.4).unwrap());
///
/// let summary = window.build().unwrap();
/// assert_eq!(summary.latest(), Ratio::new(0.4).unwrap());
/// assert!((summary.mean().value() - 0.3).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct WindowedSummary<T> {
    size: NonZeroUsize,
    values: VecDeque<T>,
}

impl<T: Metric> WindowedSummary<T> {
    pub fn new(size: NonZeroUsize) -> Self {
        Self {
            size,
            values: VecDeque::with_capacity(size.get()),
        }
    }

    /// the maximum number of values kept in the window
    #[inline]
    pub fn size(&self) -> NonZeroUsize {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn add_value(&mut self, value: T) {
        if self.values.len() == self.size.get() {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }

    /// `None` when the window is empty
    pub fn build(&self) -> Option<Summary<T>> {
        let latest = *self.values.back()?;

        let n = self.values.len() as f64;
        let mean = self.values.iter().map(|v| v.into_f64()).sum::<f64>() / n;
        let std_dev = if self.values.len() < 2 {
            0.0
        } else {
            let squares = self
                .values
                .iter()
                .map(|v| {
                    let delta = v.into_f64() - mean;
                    delta * delta
                })
                .sum::<f64>();
            (squares / (n - 1.0)).sqrt()
        };

        Some(Summary::new(latest, T::from_f64(mean), T::from_f64(std_dev)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Latency;
    use std::time::Duration;

    fn window(size: usize) -> WindowedSummary<f64> {
        WindowedSummary::new(NonZeroUsize::new(size).unwrap())
    }

    #[test]
    fn empty() {
        let window = window(3);
        assert!(window.is_empty());
        assert_eq!(window.build(), None);
    }

    #[test]
    fn single_value() {
        let mut window = window(3);
        window.add_value(4.0);

        assert_eq!(window.build(), Some(Summary::new(4.0, 4.0, 0.0)));
    }

    #[test]
    fn sample_standard_deviation() {
        let mut window = window(4);
        for value in [2.0, 4.0, 4.0, 6.0] {
            window.add_value(value);
        }

        let summary = window.build().unwrap();
        assert_eq!(summary.latest(), 6.0);
        assert_eq!(summary.mean(), 4.0);
        // squares: 4 + 0 + 0 + 4 = 8, over n - 1 = 3
        assert!((summary.std_dev() - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn evicts_oldest() {
        let mut window = window(3);
        for value in 1..=5 {
            window.add_value(value as f64);
        }

        assert_eq!(window.len(), 3);
        let summary = window.build().unwrap();
        assert_eq!(summary.latest(), 5.0);
        assert_eq!(summary.mean(), 4.0);
    }

    #[test]
    fn reset() {
        let mut window = window(3);
        window.add_value(1.0);
        window.reset();

        assert!(window.is_empty());
        assert_eq!(window.build(), None);
    }

    #[test]
    fn latency_mean() {
        let mut window = WindowedSummary::new(NonZeroUsize::new(3).unwrap());
        window.add_value(Latency::new(Duration::from_millis(10)));
        window.add_value(Latency::new(Duration::from_millis(20)));

        let summary = window.build().unwrap();
        assert_eq!(summary.mean(), Latency::new(Duration::from_millis(15)));
        assert_eq!(summary.latest(), Latency::new(Duration::from_millis(20)));
    }
}
