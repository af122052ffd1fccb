use crate::measure::{Metric, write_trimmed};
use anyhow::{anyhow, ensure};
use std::{fmt, str::FromStr, time::Duration};

/// A number of packets per second
///
/// ```
/// # use linkstats_core::measure::PacketRate;
/// # use std::time::Duration;
/// let rate = PacketRate::over(25, Duration::from_secs(2));
/// assert_eq!(rate.to_string(), "12.5pps");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct PacketRate(f64);

impl PacketRate {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub const fn from_packets_per_second(packets: f64) -> Self {
        Self(packets)
    }

    /// the rate of `packets` transmitted during `per`
    ///
    /// `per` must not be zero, use [`PacketRate::checked_over`] when it
    /// can be.
    pub fn over(packets: u64, per: Duration) -> Self {
        Self(packets as f64 / per.as_secs_f64())
    }

    /// same as [`PacketRate::over`] but returns `None` for an empty duration
    pub fn checked_over(packets: u64, per: Duration) -> Option<Self> {
        (!per.is_zero()).then(|| Self::over(packets, per))
    }

    #[inline]
    pub const fn packets_per_second(self) -> f64 {
        self.0
    }
}

impl Metric for PacketRate {
    #[inline]
    fn into_f64(self) -> f64 {
        self.0
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for PacketRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_trimmed(f, self.0, "pps")
    }
}

impl FromStr for PacketRate {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s
            .trim()
            .strip_suffix("pps")
            .ok_or_else(|| anyhow!("Expecting `pps' suffix: {s:?}"))?;
        let number: f64 = number.trim().parse()?;
        ensure!(
            number.is_finite() && number >= 0.0,
            "Expecting a non negative packet rate: {s:?}"
        );
        Ok(Self(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(PacketRate::from_packets_per_second(0.0).to_string(), "0pps");
        assert_eq!(PacketRate::from_packets_per_second(3.0).to_string(), "3pps");
        assert_eq!(
            PacketRate::from_packets_per_second(1.0 / 3.0).to_string(),
            "0.33pps"
        );
    }

    #[test]
    fn parse() {
        assert_eq!(
            "12.5pps".parse::<PacketRate>().unwrap(),
            PacketRate::from_packets_per_second(12.5)
        );
        assert!("12.5".parse::<PacketRate>().is_err());
        assert!("-1pps".parse::<PacketRate>().is_err());
    }

    #[test]
    fn over() {
        assert_eq!(
            PacketRate::over(3, Duration::from_millis(500)),
            PacketRate::from_packets_per_second(6.0)
        );
        assert_eq!(PacketRate::checked_over(3, Duration::ZERO), None);
    }
}
