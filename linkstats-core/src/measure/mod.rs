//! Units of the statistics: [`Latency`], [`DataRate`], [`PacketRate`]
//! and [`Ratio`].
//!
//! Every unit implements [`Metric`] so it can be averaged inside a
//! [`WindowedSummary`] and compared by a [`HysteresisGate`].
//!
//! [`WindowedSummary`]: crate::summary::WindowedSummary
//! [`HysteresisGate`]: crate::summary::HysteresisGate

mod data_rate;
mod latency;
mod packet_rate;
mod ratio;

pub use self::{data_rate::DataRate, latency::Latency, packet_rate::PacketRate, ratio::Ratio};
use std::fmt;

/// A unit that can be converted to and from a plain `f64`
///
/// The conversion must be lossless enough for averaging: `from_f64`
/// of the mean of some `into_f64` values is the mean value of the unit.
pub trait Metric: Copy + fmt::Debug {
    fn into_f64(self) -> f64;

    fn from_f64(value: f64) -> Self;
}

impl Metric for f64 {
    #[inline]
    fn into_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

/// write `value` followed by `unit`, with at most 2 decimal places
/// and without a fractional part when the value is whole
pub(crate) fn write_trimmed(f: &mut fmt::Formatter<'_>, value: f64, unit: &str) -> fmt::Result {
    if value.fract() == 0.0 {
        write!(f, "{value:.0}{unit}")
    } else {
        let rounded = format!("{value:.2}");
        let rounded = rounded.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{rounded}{unit}")
    }
}
