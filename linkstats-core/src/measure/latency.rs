use crate::measure::Metric;
use std::{fmt, str::FromStr, time::Duration};

/// The latency is a measure of how much a packet takes to
/// travel between the two ends of a link.
///
/// # Display
///
/// ```
/// # use linkstats_core::measure::Latency;
/// # use std::time::Duration;
/// assert_eq!(
///     Latency::new(Duration::from_millis(1_542)).to_string(),
///     "1s542ms"
/// )
/// ```
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Latency(Duration);

impl Latency {
    /// The `0` latency. I.e. no latency.
    ///
    pub const ZERO: Self = Self::new(Duration::ZERO);

    /// create a new latency with the given [`Duration`].
    #[inline(always)]
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// get the inner duration
    ///
    #[inline(always)]
    pub const fn into_duration(self) -> Duration {
        self.0
    }
}

impl From<Latency> for Duration {
    fn from(value: Latency) -> Self {
        value.into_duration()
    }
}
impl From<Duration> for Latency {
    fn from(value: Duration) -> Self {
        Self::new(value)
    }
}

/// nanoseconds
impl Metric for Latency {
    fn into_f64(self) -> f64 {
        self.0.as_nanos() as f64
    }

    fn from_f64(value: f64) -> Self {
        // saturating cast: NaN and negative values become 0
        Self(Duration::from_nanos(value.round() as u64))
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dur = crate::time::Duration::new(self.into_duration());
        fmt::Display::fmt(&dur, f)
    }
}

impl FromStr for Latency {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let duration = crate::time::Duration::from_str(s)?;

        Ok(Self::new(duration.into_duration()))
    }
}
