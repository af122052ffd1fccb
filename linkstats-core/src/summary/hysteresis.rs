use crate::measure::{Metric, Ratio};
use std::{fmt, str::FromStr};

/// The minimum relative change for a value to be considered different
///
/// A validated fraction in `(0.0, 1.0]`.
///
/// # Example
///
/// ```
/// use linkstats_core::summary::ThresholdFactor;
///
/// let factor = ThresholdFactor::new(0.05).unwrap();
/// assert_eq!(factor.to_string(), "5%");
///
/// let parsed: ThresholdFactor = "5%".parse().unwrap();
/// assert_eq!(parsed, factor);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdFactor(f64);

impl ThresholdFactor {
    /// Create a new validated threshold factor.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdFactorError`] if `factor` is NaN, not strictly
    /// positive, or greater than `1.0`.
    pub fn new(factor: f64) -> Result<Self, ThresholdFactorError> {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ThresholdFactorError(factor));
        }
        Ok(Self(factor))
    }

    /// only for constants known to be valid
    pub(crate) const fn new_unchecked(factor: f64) -> Self {
        Self(factor)
    }

    /// Returns the inner `f64` value.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for ThresholdFactor {
    fn default() -> Self {
        crate::defaults::DEFAULT_HYSTERESIS_THRESHOLD
    }
}

impl fmt::Display for ThresholdFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&<Ratio as Metric>::from_f64(self.0), f)
    }
}

impl FromStr for ThresholdFactor {
    type Err = ThresholdFactorParseError;

    /// Parses a percentage string like `"5%"` or `"0.5%"`.
    ///
    /// The `%` suffix is required.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(num) = s.strip_suffix('%') else {
            return Err(ThresholdFactorParseError::MissingSuffix);
        };
        let pct: f64 = num
            .trim()
            .parse()
            .map_err(|_| ThresholdFactorParseError::InvalidNumber)?;
        Ok(ThresholdFactor::new(pct / 100.0)?)
    }
}

/// Error returned when constructing a [`ThresholdFactor`] outside of `(0.0, 1.0]`.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("hysteresis threshold factor must be in (0.0, 1.0], got {0}")]
pub struct ThresholdFactorError(f64);

/// Error returned when parsing a [`ThresholdFactor`] from a string.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ThresholdFactorParseError {
    /// The string does not end with `%`.
    #[error("expected '%' suffix")]
    MissingSuffix,
    /// The numeric part could not be parsed as a float.
    #[error("invalid number before '%'")]
    InvalidNumber,
    /// The parsed percentage is outside `(0, 100]`.
    #[error("{0}")]
    OutOfRange(#[from] ThresholdFactorError),
}

/// Tells whether `candidate` is significantly different from `previous`
///
/// * absent to absent is never a change;
/// * absent to present (and back) is always a change;
/// * otherwise the values differ when `|candidate - previous|` exceeds
///   `|previous| * factor`.
///
/// ```
/// # use linkstats_core::summary::{changed, ThresholdFactor};
/// let factor = ThresholdFactor::new(0.05).unwrap();
///
/// assert!(!changed(Some(100.0), Some(104.0), factor));
/// assert!(changed(Some(100.0), Some(106.0), factor));
/// assert!(changed(None, Some(0.0), factor));
/// assert!(!changed(None, None, factor));
/// ```
pub fn changed(previous: Option<f64>, candidate: Option<f64>, factor: ThresholdFactor) -> bool {
    match (previous, candidate) {
        (None, None) => false,
        (None, Some(_)) | (Some(_), None) => true,
        (Some(previous), Some(candidate)) => {
            if !previous.is_finite() || !candidate.is_finite() {
                return previous.to_bits() != candidate.to_bits();
            }
            (candidate - previous).abs() > previous.abs() * factor.value()
        }
    }
}

/// Remembers the last significant value of a series
///
/// A candidate only replaces the remembered value if it [`changed`]
/// enough from it. Small drifts are therefore absorbed, but they do
/// not accumulate: the comparison is always against the last accepted
/// value.
#[derive(Debug, Clone, Copy)]
pub struct HysteresisGate {
    factor: ThresholdFactor,
    value: Option<f64>,
}

impl HysteresisGate {
    pub fn new(factor: ThresholdFactor) -> Self {
        Self {
            factor,
            value: None,
        }
    }

    #[inline]
    pub fn factor(&self) -> ThresholdFactor {
        self.factor
    }

    /// the last accepted value
    #[inline]
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// submit a new candidate, returns `true` if it was accepted
    pub fn update(&mut self, candidate: Option<f64>) -> bool {
        let accepted = changed(self.value, candidate, self.factor);
        if accepted {
            self.value = candidate;
        }
        accepted
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}
