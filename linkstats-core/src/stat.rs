//! Timestamped values and the [`Stat`] wrapper every snapshot field
//! is made of.

use crate::{
    measure::{DataRate, Latency, Metric, PacketRate, Ratio},
    summary::Summary,
};
use std::{fmt, time::SystemTime};

/// A value and the instant it was measured at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timed<T> {
    value: T,
    timestamp: SystemTime,
}

impl<T> Timed<T> {
    pub const fn new(value: T, timestamp: SystemTime) -> Self {
        Self { value, timestamp }
    }

    /// timestamp `value` with the current time
    pub fn now(value: T) -> Self {
        Self::new(value, SystemTime::now())
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    #[inline]
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Timed<U> {
        Timed::new(f(self.value), self.timestamp)
    }
}

/// How much a statistic can be relied upon
///
/// Statistics derived from authenticated probes or from configuration
/// are [`Trust::Safe`]. Values reported by the switches themselves (LLDP
/// latency, flow counters) are [`Trust::Unsafe`], and so is any absent
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trust {
    Safe,
    Unsafe,
}

/// A possibly absent, timestamped statistic
///
/// Equality ignores the timestamp: two stats are equal when they hold
/// the same value with the same [`Trust`].
///
/// ```
/// # use linkstats_core::{measure::Ratio, stat::{Stat, Trust}};
/// # use std::time::{Duration, SystemTime};
/// let t0 = SystemTime::UNIX_EPOCH;
/// let t1 = t0 + Duration::from_secs(1);
///
/// let a = Stat::new(Some(Ratio::ZERO), t0, Trust::Safe);
/// let b = Stat::new(Some(Ratio::ZERO), t1, Trust::Safe);
/// assert_eq!(a, b);
///
/// let absent = Stat::<Ratio>::new(None, t0, Trust::Safe);
/// assert_eq!(absent.trust(), Trust::Unsafe);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Stat<T> {
    value: Option<T>,
    timestamp: SystemTime,
    trust: Trust,
}

impl<T> Stat<T> {
    /// `trust` only applies if `value` is present
    pub fn new(value: Option<T>, timestamp: SystemTime, trust: Trust) -> Self {
        let trust = if value.is_some() { trust } else { Trust::Unsafe };
        Self {
            value,
            timestamp,
            trust,
        }
    }

    pub fn from_timed(timed: Timed<Option<T>>, trust: Trust) -> Self {
        let Timed { value, timestamp } = timed;
        Self::new(value, timestamp, trust)
    }

    pub fn absent(timestamp: SystemTime) -> Self {
        Self::new(None, timestamp, Trust::Unsafe)
    }

    #[inline]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    #[inline]
    pub fn trust(&self) -> Trust {
        self.trust
    }

    #[inline]
    pub fn is_safe(&self) -> bool {
        self.trust == Trust::Safe
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Stat<U> {
        Stat::new(self.value.map(f), self.timestamp, self.trust)
    }

    /// `self` if present, otherwise `other`
    pub fn or(self, other: Self) -> Self {
        if self.is_present() { self } else { other }
    }
}

impl<T: Copy> Stat<T> {
    #[inline]
    pub fn get(&self) -> Option<T> {
        self.value
    }
}

impl<T: PartialEq> PartialEq for Stat<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.trust == other.trust
    }
}

impl<T: fmt::Display> fmt::Display for Stat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, self.trust) {
            (None, _) => f.write_str("n/a"),
            (Some(value), Trust::Safe) => fmt::Display::fmt(value, f),
            (Some(value), Trust::Unsafe) => write!(f, "{value} (unsafe)"),
        }
    }
}

/// The scalar a statistic is compared by when looking for changes
pub trait Primary {
    fn primary(&self) -> f64;
}

impl<T: Metric> Primary for Summary<T> {
    fn primary(&self) -> f64 {
        self.mean().into_f64()
    }
}

macro_rules! primary_metric {
    ($($ty:ty),+) => {
        $(
            impl Primary for $ty {
                fn primary(&self) -> f64 {
                    self.into_f64()
                }
            }
        )+
    };
}

primary_metric!(Latency, DataRate, PacketRate, Ratio);

impl<T: Primary> Stat<T> {
    /// same presence and same primary value
    pub fn has_same_core(&self, other: &Self) -> bool {
        match (&self.value, &other.value) {
            (None, None) => true,
            (Some(a), Some(b)) => a.primary().to_bits() == b.primary().to_bits(),
            _ => false,
        }
    }
}
