use crate::measure::{Metric, write_trimmed};
use anyhow::{bail, ensure};
use logos::{Lexer, Logos};
use std::{fmt, str::FromStr, time::Duration};

/// An amount of data transmitted per second, in bits
///
/// Used both for configured link capacities (port speeds, virtual
/// capacities) and for measured throughputs.
///
/// # Example
///
/// ```
/// # use linkstats_core::measure::DataRate;
/// # use std::time::Duration;
/// let rate = DataRate::over(12_500_000, Duration::from_secs(1));
/// assert_eq!(rate, "100Mbps".parse().unwrap());
/// assert_eq!(rate.to_string(), "100Mbps");
/// ```
///
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct DataRate(f64);

const K: f64 = 1_000.0;
const M: f64 = 1_000_000.0;
const G: f64 = 1_000_000_000.0;
const T: f64 = 1_000_000_000_000.0;

impl DataRate {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub const fn from_bits_per_second(bits: f64) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn from_bytes_per_second(bytes: f64) -> Self {
        Self(bytes * 8.0)
    }

    /// the rate of `bytes` transmitted during `per`
    ///
    /// `per` must not be zero, use [`DataRate::checked_over`] when it
    /// can be.
    pub fn over(bytes: u64, per: Duration) -> Self {
        Self::from_bytes_per_second(bytes as f64 / per.as_secs_f64())
    }

    /// same as [`DataRate::over`] but returns `None` for an empty duration
    pub fn checked_over(bytes: u64, per: Duration) -> Option<Self> {
        (!per.is_zero()).then(|| Self::over(bytes, per))
    }

    #[inline]
    pub const fn bits_per_second(self) -> f64 {
        self.0
    }

    #[inline]
    pub const fn bytes_per_second(self) -> f64 {
        self.0 / 8.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// `self - other`, or zero if `other` is larger
    #[must_use = "function does not modify the current value"]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self((self.0 - other.0).max(0.0))
    }
}

impl Metric for DataRate {
    #[inline]
    fn into_f64(self) -> f64 {
        self.0
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v < K {
            write_trimmed(f, v, "bps")
        } else if v < M {
            write_trimmed(f, v / K, "kbps")
        } else if v < G {
            write_trimmed(f, v / M, "Mbps")
        } else if v < T {
            write_trimmed(f, v / G, "Gbps")
        } else {
            write_trimmed(f, v / T, "Tbps")
        }
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")]
enum DataRateToken {
    #[token("bps")]
    Bps,
    #[regex("[kK]bps")]
    Kbps,
    #[regex("[mM]bps")]
    Mbps,
    #[regex("[gG]bps")]
    Gbps,
    #[regex("[tT]bps")]
    Tbps,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Value,
}

impl FromStr for DataRate {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::<'_, DataRateToken>::new(s);

        let Some(Ok(DataRateToken::Value)) = lex.next() else {
            bail!("Expecting to parse a number")
        };
        let number: f64 = lex.slice().parse()?;
        let Some(Ok(token)) = lex.next() else {
            bail!("Expecting to parse a unit")
        };
        let bps = match token {
            DataRateToken::Bps => number,
            DataRateToken::Kbps => number * K,
            DataRateToken::Mbps => number * M,
            DataRateToken::Gbps => number * G,
            DataRateToken::Tbps => number * T,
            DataRateToken::Value => bail!("Expecting to parse a unit (bps, kbps, ...)"),
        };

        ensure!(
            lex.next().is_none(),
            "Not expecting any other tokens to parse a data rate"
        );

        Ok(Self(bps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_data_rate() {
        macro_rules! assert_data_rate {
            ($string:literal == $value:expr) => {
                assert_eq!(
                    $string.parse::<DataRate>().unwrap(),
                    DataRate::from_bits_per_second($value)
                );
            };
        }

        assert_data_rate!("0bps" == 0.0);
        assert_data_rate!("42bps" == 42.0);
        assert_data_rate!("42kbps" == 42_000.0);
        assert_data_rate!("42Mbps" == 42_000_000.0);
        assert_data_rate!("42mbps" == 42_000_000.0);
        assert_data_rate!("1.5Gbps" == 1_500_000_000.0);
        assert_data_rate!("10 Gbps" == 10_000_000_000.0);
    }

    #[test]
    fn print_data_rate() {
        macro_rules! assert_data_rate {
            (($bits:expr) == $string:literal) => {
                assert_eq!(
                    DataRate::from_bits_per_second($bits).to_string(),
                    $string
                );
            };
        }

        assert_data_rate!((0.0) == "0bps");
        assert_data_rate!((999.0) == "999bps");
        assert_data_rate!((1_500.0) == "1.5kbps");
        assert_data_rate!((100_000_000.0) == "100Mbps");
        assert_data_rate!((1_234_567_890.0) == "1.23Gbps");
        assert_data_rate!((40.0 * T) == "40Tbps");
    }

    #[test]
    fn parse_invalid_strings() {
        assert!("42".parse::<DataRate>().is_err());
        assert!("mbps".parse::<DataRate>().is_err());
        assert!("".parse::<DataRate>().is_err());
        assert!("42mbps extra".parse::<DataRate>().is_err());
    }

    #[test]
    fn over() {
        let rate = DataRate::over(1_000, Duration::from_millis(500));
        assert_eq!(rate.bytes_per_second(), 2_000.0);
        assert_eq!(rate.bits_per_second(), 16_000.0);

        assert_eq!(DataRate::checked_over(1_000, Duration::ZERO), None);
    }

    #[test]
    fn saturating_sub() {
        let low = DataRate::from_bits_per_second(10.0);
        let high = DataRate::from_bits_per_second(25.0);

        assert_eq!(high.saturating_sub(low), DataRate::from_bits_per_second(15.0));
        assert_eq!(low.saturating_sub(high), DataRate::ZERO);
    }
}
