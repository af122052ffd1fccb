use crate::measure::Metric;
use std::{fmt, str::FromStr};

/// A non negative fraction such as a loss ratio or a link utilization.
///
/// `0.0` means none, `1.0` means all of it. Loss ratios stay within
/// `[0.0, 1.0]`, utilizations may exceed `1.0` when the measured traffic
/// is above the capacity.
///
/// # Example
///
/// ```
/// use linkstats_core::measure::Ratio;
///
/// let loss = Ratio::of(1.0, 2.0).unwrap();
/// assert_eq!(loss.to_string(), "50%");
///
/// let parsed: Ratio = "50%".parse().unwrap();
/// assert_eq!(parsed, loss);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Ratio(f64);

impl Ratio {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    /// Create a new validated ratio.
    ///
    /// # Errors
    ///
    /// Returns [`RatioError`] if `fraction` is NaN, infinite or negative.
    pub fn new(fraction: f64) -> Result<Self, RatioError> {
        if !fraction.is_finite() || fraction < 0.0 {
            return Err(RatioError(fraction));
        }
        Ok(Self(fraction))
    }

    /// `part / whole`, or `None` when the result is not a valid ratio
    /// (`whole` is zero, or either operand is negative or not finite).
    ///
    /// ```
    /// # use linkstats_core::measure::Ratio;
    /// assert_eq!(Ratio::of(0.0, 0.0), None);
    /// assert_eq!(Ratio::of(3.0, 4.0).unwrap().value(), 0.75);
    /// ```
    pub fn of(part: f64, whole: f64) -> Option<Self> {
        Self::new(part / whole).ok()
    }

    /// `(total - kept) / total`, the fraction of `total` that was lost
    ///
    /// `None` when nothing was sent. `kept` larger than `total` counts
    /// as no loss.
    pub fn lost(total: u64, kept: u64) -> Option<Self> {
        Self::of(total.saturating_sub(kept) as f64, total as f64)
    }

    /// Returns the inner `f64` value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Metric for Ratio {
    #[inline]
    fn into_f64(self) -> f64 {
        self.0
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Ratio {
    /// Formats as a percentage with up to 2 decimal places.
    ///
    /// - `0.05` → `"5%"`
    /// - `0.123` → `"12.30%"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = self.0 * 100.0;
        // If the percentage is a whole number, skip decimal places.
        if pct.fract() == 0.0 {
            write!(f, "{}%", pct as u64)
        } else {
            write!(f, "{:.2}%", pct)
        }
    }
}

impl FromStr for Ratio {
    type Err = RatioParseError;

    /// Parses a percentage string like `"0%"`, `"5%"`, `"12.30%"`, `"150%"`.
    ///
    /// The `%` suffix is required.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(num) = s.strip_suffix('%') else {
            return Err(RatioParseError::MissingSuffix);
        };
        let pct: f64 = num
            .trim()
            .parse()
            .map_err(|_| RatioParseError::InvalidNumber)?;
        Ok(Ratio::new(pct / 100.0)?)
    }
}

/// Error returned when constructing a [`Ratio`] from an invalid fraction.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("ratio must be a finite non negative number, got {0}")]
pub struct RatioError(f64);

/// Error returned when parsing a [`Ratio`] from a string.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RatioParseError {
    /// The string does not end with `%`.
    #[error("expected '%' suffix")]
    MissingSuffix,
    /// The numeric part could not be parsed as a float.
    #[error("invalid number before '%'")]
    InvalidNumber,
    /// The parsed percentage is negative or not finite.
    #[error("{0}")]
    OutOfRange(#[from] RatioError),
}
