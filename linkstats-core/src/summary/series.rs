use crate::{
    measure::Metric,
    stat::Timed,
    summary::{HysteresisGate, Summary, ThresholdFactor, WindowedSummary},
};
use std::{marker::PhantomData, num::NonZeroUsize, time::SystemTime};

/// A [`WindowedSummary`] whose mean is filtered by a [`HysteresisGate`]
///
/// The gate is fed every time the window changes, so the reported mean
/// only moves when the window mean drifted far enough from the last
/// reported one.
#[derive(Debug, Clone)]
pub struct HysteresisSeries<T> {
    window: WindowedSummary<T>,
    gate: HysteresisGate,
    timestamp: SystemTime,
}

impl<T: Metric> HysteresisSeries<T> {
    pub fn new(window: NonZeroUsize, factor: ThresholdFactor, timestamp: SystemTime) -> Self {
        Self {
            window: WindowedSummary::new(window),
            gate: HysteresisGate::new(factor),
            timestamp,
        }
    }

    pub fn add(&mut self, value: T, timestamp: SystemTime) {
        self.extend([value], timestamp);
    }

    /// add all the values of one round, the gate sees the mean only
    /// once all of them are in the window
    pub fn extend<I>(&mut self, values: I, timestamp: SystemTime)
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.window.add_value(value);
        }
        self.gate.update(self.window_mean());
        self.timestamp = timestamp;
    }

    /// drop every value, the series becomes absent
    pub fn reset(&mut self, timestamp: SystemTime) {
        self.window.reset();
        self.gate.reset();
        self.timestamp = timestamp;
    }

    fn window_mean(&self) -> Option<f64> {
        self.window.build().map(|summary| summary.mean().into_f64())
    }

    /// the window summary with the gated mean
    pub fn summary(&self) -> Timed<Option<Summary<T>>> {
        let summary = self
            .window
            .build()
            .zip(self.gate.value())
            .map(|(summary, mean)| summary.with_mean(T::from_f64(mean)));
        Timed::new(summary, self.timestamp)
    }
}

/// A single value filtered by a [`HysteresisGate`], without a window
#[derive(Debug, Clone)]
pub struct HysteresisRate<T> {
    gate: HysteresisGate,
    timestamp: SystemTime,
    _metric: PhantomData<T>,
}

impl<T: Metric> HysteresisRate<T> {
    pub fn new(factor: ThresholdFactor, timestamp: SystemTime) -> Self {
        Self {
            gate: HysteresisGate::new(factor),
            timestamp,
            _metric: PhantomData,
        }
    }

    /// an absent value resets the rate
    pub fn set(&mut self, value: Option<T>, timestamp: SystemTime) {
        self.gate.update(value.map(T::into_f64));
        self.timestamp = timestamp;
    }

    pub fn reset(&mut self, timestamp: SystemTime) {
        self.gate.reset();
        self.timestamp = timestamp;
    }

    pub fn rate(&self) -> Timed<Option<T>> {
        Timed::new(self.gate.value().map(T::from_f64), self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::DataRate;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn series() -> HysteresisSeries<f64> {
        HysteresisSeries::new(
            NonZeroUsize::new(3).unwrap(),
            ThresholdFactor::new(0.05).unwrap(),
            at(0),
        )
    }

    #[test]
    fn starts_absent() {
        let series = series();
        let summary = series.summary();
        assert_eq!(summary.value(), &None);
        assert_eq!(summary.timestamp(), at(0));
    }

    #[test]
    fn small_changes_keep_reported_mean() {
        let mut series = series();
        series.add(100.0, at(1));
        series.add(102.0, at(2));

        let summary = series.summary().into_value().unwrap();
        assert_eq!(summary.mean(), 100.0);
        assert_eq!(summary.latest(), 102.0);
        assert!(summary.std_dev() > 0.0);
    }

    #[test]
    fn large_changes_move_reported_mean() {
        let mut series = series();
        series.add(100.0, at(1));
        series.add(130.0, at(2));

        let summary = series.summary();
        assert_eq!(summary.timestamp(), at(2));
        assert_eq!(summary.into_value().unwrap().mean(), 115.0);
    }

    #[test]
    fn extend_gates_once() {
        let mut series = series();
        series.add(100.0, at(1));
        // intermediate mean 150 would pass the gate, the final one does not
        series.extend([200.0, 4.0], at(2));

        assert_eq!(series.summary().into_value().unwrap().mean(), 100.0);
    }

    #[test]
    fn reset_makes_absent() {
        let mut series = series();
        series.add(100.0, at(1));
        series.reset(at(2));

        let summary = series.summary();
        assert_eq!(summary.value(), &None);
        assert_eq!(summary.timestamp(), at(2));

        series.add(1.0, at(3));
        assert_eq!(series.summary().into_value().unwrap().mean(), 1.0);
    }

    #[test]
    fn rate() {
        let mut rate = HysteresisRate::new(ThresholdFactor::new(0.1).unwrap(), at(0));
        assert_eq!(rate.rate().into_value(), None);

        rate.set(Some(DataRate::from_bits_per_second(1_000.0)), at(1));
        rate.set(Some(DataRate::from_bits_per_second(1_050.0)), at(2));
        assert_eq!(
            rate.rate().into_value(),
            Some(DataRate::from_bits_per_second(1_000.0))
        );
        assert_eq!(rate.rate().timestamp(), at(2));

        rate.set(None, at(3));
        assert_eq!(rate.rate().into_value(), None);
    }
}
