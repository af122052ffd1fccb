use crate::{
    calculator::Update,
    measure::Latency,
    stat::{Stat, Timed, Trust},
    stats::{CoreStats, StatsBuilder},
    summary::{HysteresisSeries, Summary, ThresholdFactor},
};
use std::{num::NonZeroUsize, time::SystemTime};

/// Latency of a link as measured with LLDP probes
///
/// LLDP probes are forwarded by the switches without any protection,
/// the latency is therefore never trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct LldpProbingStats {
    latency: Stat<Summary<Latency>>,
    updates: u64,
}

impl LldpProbingStats {
    pub fn absent(timestamp: SystemTime) -> Self {
        Self {
            latency: Stat::absent(timestamp),
            updates: 0,
        }
    }

    pub fn latency(&self) -> Stat<Summary<Latency>> {
        self.latency
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl CoreStats for LldpProbingStats {
    fn has_same_core_stats(&self, other: &Self) -> bool {
        self.latency.has_same_core(&other.latency)
    }
}

#[derive(Debug, Clone)]
pub struct LldpProbingBuilder {
    latency: HysteresisSeries<Latency>,
    updates: u64,
}

impl LldpProbingBuilder {
    pub fn new(latency_window: NonZeroUsize, factor: ThresholdFactor) -> Self {
        Self {
            latency: HysteresisSeries::new(latency_window, factor, SystemTime::now()),
            updates: 0,
        }
    }

    pub fn apply(&mut self, update: Update<Timed<Latency>>) {
        match update {
            Update::Clear => self.latency.reset(SystemTime::now()),
            Update::Round(latency) => self.latency.add(*latency.value(), latency.timestamp()),
        }
        self.updates = self.updates.saturating_add(1);
    }
}

impl StatsBuilder for LldpProbingBuilder {
    type Stats = LldpProbingStats;

    fn build(&self) -> LldpProbingStats {
        LldpProbingStats {
            latency: Stat::from_timed(self.latency.summary(), Trust::Unsafe),
            updates: self.updates,
        }
    }
}
