use crate::summary::ThresholdFactor;
use std::num::NonZeroUsize;

/// Default size of every statistics window
///
/// This is the number of measurement rounds averaged by the latency,
/// loss and drop rate summaries.
///
/// ```
/// # use linkstats_core::defaults::*;
/// assert_eq!(DEFAULT_WINDOW_SIZE.get(), 3);
/// ```
pub const DEFAULT_WINDOW_SIZE: NonZeroUsize = NonZeroUsize::new(3).unwrap();

/// Default hysteresis threshold
///
/// A statistic is reported as changed only when it moves by more than
/// this fraction of its previously reported value.
///
/// ```
/// # use linkstats_core::defaults::*;
/// assert_eq!(
///     DEFAULT_HYSTERESIS_THRESHOLD.to_string(),
///     "5%"
/// );
/// ```
pub const DEFAULT_HYSTERESIS_THRESHOLD: ThresholdFactor = ThresholdFactor::new_unchecked(0.05);
