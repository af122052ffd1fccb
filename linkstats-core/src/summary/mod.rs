//! Windowed summaries and the hysteresis machinery that decides when a
//! recomputed value is worth reporting.

mod hysteresis;
mod series;
mod window;

pub use self::{
    hysteresis::{
        HysteresisGate, ThresholdFactor, ThresholdFactorError, ThresholdFactorParseError, changed,
    },
    series::{HysteresisRate, HysteresisSeries},
    window::WindowedSummary,
};
use crate::measure::Metric;
use std::fmt;

/// The summary of the values of a [`WindowedSummary`]
///
/// `mean` is the reported central value. When the summary comes out
/// of a [`HysteresisSeries`] it is the last mean that passed the
/// [`HysteresisGate`], which may differ slightly from the mean of the
/// current window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary<T> {
    latest: T,
    mean: T,
    std_dev: T,
}

impl<T: Metric> Summary<T> {
    pub fn new(latest: T, mean: T, std_dev: T) -> Self {
        Self {
            latest,
            mean,
            std_dev,
        }
    }

    /// the summary of a single value
    pub fn single(value: T) -> Self {
        Self::new(value, value, T::from_f64(0.0))
    }

    /// the most recently added value
    #[inline]
    pub fn latest(&self) -> T {
        self.latest
    }

    #[inline]
    pub fn mean(&self) -> T {
        self.mean
    }

    /// sample standard deviation of the window
    #[inline]
    pub fn std_dev(&self) -> T {
        self.std_dev
    }

    #[must_use = "function does not modify the current value"]
    pub(crate) fn with_mean(self, mean: T) -> Self {
        Self { mean, ..self }
    }
}

impl<T: fmt::Display> fmt::Display for Summary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (±{}, latest {})",
            self.mean, self.std_dev, self.latest
        )
    }
}
