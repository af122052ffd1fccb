use crate::{
    calculator::{SecureProbingRound, Update},
    measure::{Latency, Ratio},
    stat::{Stat, Trust},
    stats::{CoreStats, StatsBuilder},
    summary::{HysteresisSeries, Summary, ThresholdFactor},
};
use std::{num::NonZeroUsize, time::SystemTime};

/// Latency and loss of a link as measured with authenticated probes
#[derive(Debug, Clone, PartialEq)]
pub struct SecureProbingStats {
    latency: Stat<Summary<Latency>>,
    byte_loss: Stat<Summary<Ratio>>,
    packet_loss: Stat<Summary<Ratio>>,
    updates: u64,
}

impl SecureProbingStats {
    pub fn absent(timestamp: SystemTime) -> Self {
        Self {
            latency: Stat::absent(timestamp),
            byte_loss: Stat::absent(timestamp),
            packet_loss: Stat::absent(timestamp),
            updates: 0,
        }
    }

    pub fn latency(&self) -> Stat<Summary<Latency>> {
        self.latency
    }

    pub fn byte_loss(&self) -> Stat<Summary<Ratio>> {
        self.byte_loss
    }

    pub fn packet_loss(&self) -> Stat<Summary<Ratio>> {
        self.packet_loss
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl CoreStats for SecureProbingStats {
    fn has_same_core_stats(&self, other: &Self) -> bool {
        self.latency.has_same_core(&other.latency)
            && self.byte_loss.has_same_core(&other.byte_loss)
            && self.packet_loss.has_same_core(&other.packet_loss)
    }
}

#[derive(Debug, Clone)]
pub struct SecureProbingBuilder {
    latency: HysteresisSeries<Latency>,
    byte_loss: HysteresisSeries<Ratio>,
    packet_loss: HysteresisSeries<Ratio>,
    updates: u64,
}

impl SecureProbingBuilder {
    pub fn new(
        latency_window: NonZeroUsize,
        loss_window: NonZeroUsize,
        factor: ThresholdFactor,
    ) -> Self {
        let now = SystemTime::now();
        Self {
            latency: HysteresisSeries::new(latency_window, factor, now),
            byte_loss: HysteresisSeries::new(loss_window, factor, now),
            packet_loss: HysteresisSeries::new(loss_window, factor, now),
            updates: 0,
        }
    }

    /// a round without a latency or without a loss resets that series
    pub fn apply(&mut self, update: Update<SecureProbingRound>) {
        match update {
            Update::Clear => {
                let now = SystemTime::now();
                self.latency.reset(now);
                self.byte_loss.reset(now);
                self.packet_loss.reset(now);
            }
            Update::Round(round) => {
                let at = round.timestamp;
                match round.latency {
                    Some(latency) => self.latency.add(latency, at),
                    None => self.latency.reset(at),
                }
                match round.byte_loss {
                    Some(loss) => self.byte_loss.add(loss, at),
                    None => self.byte_loss.reset(at),
                }
                match round.packet_loss {
                    Some(loss) => self.packet_loss.add(loss, at),
                    None => self.packet_loss.reset(at),
                }
            }
        }
        self.updates = self.updates.saturating_add(1);
    }
}

impl StatsBuilder for SecureProbingBuilder {
    type Stats = SecureProbingStats;

    fn build(&self) -> SecureProbingStats {
        SecureProbingStats {
            latency: Stat::from_timed(self.latency.summary(), Trust::Safe),
            byte_loss: Stat::from_timed(self.byte_loss.summary(), Trust::Safe),
            packet_loss: Stat::from_timed(self.packet_loss.summary(), Trust::Safe),
            updates: self.updates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn builder() -> SecureProbingBuilder {
        let window = NonZeroUsize::new(3).unwrap();
        SecureProbingBuilder::new(window, window, ThresholdFactor::default())
    }

    fn round(latency: Option<u64>, loss: Option<f64>) -> Update<SecureProbingRound> {
        let loss = loss.map(|loss| Ratio::new(loss).unwrap());
        Update::Round(SecureProbingRound {
            latency: latency.map(|ms| Latency::new(Duration::from_millis(ms))),
            byte_loss: loss,
            packet_loss: loss,
            timestamp: SystemTime::now(),
        })
    }

    #[test]
    fn lost_probe_resets_latency_only() {
        let mut builder = builder();
        builder.apply(round(Some(4), Some(0.0)));
        builder.apply(round(None, Some(1.0)));

        let stats = builder.build();
        assert!(!stats.latency().is_present());
        assert_eq!(
            stats.packet_loss().get().map(|s| s.latest()),
            Some(Ratio::ONE)
        );
        assert!(stats.packet_loss().is_safe());
        assert_eq!(stats.updates(), 2);
    }

    #[test]
    fn clear_resets_everything() {
        let mut builder = builder();
        builder.apply(round(Some(4), Some(0.0)));
        builder.apply(Update::Clear);

        let stats = builder.build();
        assert!(!stats.latency().is_present());
        assert!(!stats.byte_loss().is_present());
        assert!(!stats.packet_loss().is_present());
    }

    #[test]
    fn core_stats_follow_the_gate() {
        let mut builder = builder();
        builder.apply(round(Some(100), Some(0.0)));
        let first = builder.build();

        builder.apply(round(Some(102), Some(0.0)));
        let second = builder.build();
        assert!(first.has_same_core_stats(&second));
        assert_ne!(first, second);

        builder.apply(round(Some(200), Some(0.0)));
        assert!(!second.has_same_core_stats(&builder.build()));
    }
}
