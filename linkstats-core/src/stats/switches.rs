use crate::{
    measure::PacketRate,
    stat::{Stat, Timed, Trust},
    stats::{CoreStats, StatsBuilder},
    summary::{HysteresisSeries, Summary, ThresholdFactor},
};
use std::{num::NonZeroUsize, time::SystemTime};

/// Packet drop rates of the switches at both ends of a link
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchesStats {
    source_packet_drop_rate: Stat<Summary<PacketRate>>,
    destination_packet_drop_rate: Stat<Summary<PacketRate>>,
    updates: u64,
}

impl SwitchesStats {
    pub fn absent(timestamp: SystemTime) -> Self {
        Self {
            source_packet_drop_rate: Stat::absent(timestamp),
            destination_packet_drop_rate: Stat::absent(timestamp),
            updates: 0,
        }
    }

    pub fn source_packet_drop_rate(&self) -> Stat<Summary<PacketRate>> {
        self.source_packet_drop_rate
    }

    pub fn destination_packet_drop_rate(&self) -> Stat<Summary<PacketRate>> {
        self.destination_packet_drop_rate
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl CoreStats for SwitchesStats {
    fn has_same_core_stats(&self, other: &Self) -> bool {
        self.source_packet_drop_rate
            .has_same_core(&other.source_packet_drop_rate)
            && self
                .destination_packet_drop_rate
                .has_same_core(&other.destination_packet_drop_rate)
    }
}

#[derive(Debug, Clone)]
pub struct SwitchesBuilder {
    source: HysteresisSeries<PacketRate>,
    destination: HysteresisSeries<PacketRate>,
    updates: u64,
}

impl SwitchesBuilder {
    pub fn new(drop_rate_window: NonZeroUsize, factor: ThresholdFactor) -> Self {
        let now = SystemTime::now();
        Self {
            source: HysteresisSeries::new(drop_rate_window, factor, now),
            destination: HysteresisSeries::new(drop_rate_window, factor, now),
            updates: 0,
        }
    }

    pub fn set_source_packet_drop_rate(&mut self, rate: Timed<PacketRate>) {
        self.source.add(*rate.value(), rate.timestamp());
        self.updates = self.updates.saturating_add(1);
    }

    pub fn set_destination_packet_drop_rate(&mut self, rate: Timed<PacketRate>) {
        self.destination.add(*rate.value(), rate.timestamp());
        self.updates = self.updates.saturating_add(1);
    }
}

impl StatsBuilder for SwitchesBuilder {
    type Stats = SwitchesStats;

    fn build(&self) -> SwitchesStats {
        SwitchesStats {
            source_packet_drop_rate: Stat::from_timed(self.source.summary(), Trust::Safe),
            destination_packet_drop_rate: Stat::from_timed(
                self.destination.summary(),
                Trust::Safe,
            ),
            updates: self.updates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_sides() {
        let mut builder =
            SwitchesBuilder::new(NonZeroUsize::new(2).unwrap(), ThresholdFactor::default());
        builder.set_source_packet_drop_rate(Timed::now(PacketRate::from_packets_per_second(4.0)));

        let stats = builder.build();
        assert_eq!(
            stats.source_packet_drop_rate().get().map(|s| s.mean()),
            Some(PacketRate::from_packets_per_second(4.0))
        );
        assert!(!stats.destination_packet_drop_rate().is_present());
        assert_eq!(stats.updates(), 1);
    }
}
