use crate::{
    calculator::{Rates, TrajectoryRound, Update},
    measure::{DataRate, Latency, Metric, PacketRate, Ratio},
    stat::{Primary, Stat, Trust},
    stats::{CoreStats, StatsBuilder},
    summary::{HysteresisRate, HysteresisSeries, Summary, ThresholdFactor},
};
use std::{
    num::NonZeroUsize,
    time::{Duration, SystemTime},
};

/// something measured at the source and at the destination
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sides<T> {
    transmission: T,
    reception: T,
}

impl<T: Primary> Sides<Stat<T>> {
    fn absent(timestamp: SystemTime) -> Self {
        Self {
            transmission: Stat::absent(timestamp),
            reception: Stat::absent(timestamp),
        }
    }

    fn has_same_core(&self, other: &Self) -> bool {
        self.transmission.has_same_core(&other.transmission)
            && self.reception.has_same_core(&other.reception)
    }
}

impl<T: Metric> Sides<HysteresisRate<T>> {
    fn new(factor: ThresholdFactor, timestamp: SystemTime) -> Self {
        Self {
            transmission: HysteresisRate::new(factor, timestamp),
            reception: HysteresisRate::new(factor, timestamp),
        }
    }

    fn set(&mut self, rates: Rates<T>, timestamp: SystemTime) {
        self.transmission.set(rates.transmission, timestamp);
        self.reception.set(rates.reception, timestamp);
    }

    fn reset(&mut self, timestamp: SystemTime) {
        self.transmission.reset(timestamp);
        self.reception.reset(timestamp);
    }

    fn build(&self) -> Sides<Stat<T>> {
        Sides {
            transmission: Stat::from_timed(self.transmission.rate(), Trust::Safe),
            reception: Stat::from_timed(self.reception.rate(), Trust::Safe),
        }
    }
}

/// Statistics of a flow derived from the trajectory of its mirrored
/// packets
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryStats {
    latency: Stat<Summary<Latency>>,
    byte_loss: Stat<Summary<Ratio>>,
    packet_loss: Stat<Summary<Ratio>>,
    data_goodput: Stat<DataRate>,
    packet_goodput: Stat<PacketRate>,
    data_rates: Sides<Stat<DataRate>>,
    packet_rates: Sides<Stat<PacketRate>>,
    unmatched_data_rates: Sides<Stat<DataRate>>,
    unmatched_packet_rates: Sides<Stat<PacketRate>>,
    last_round_duration: Option<Duration>,
    last_transmission_duration: Option<Duration>,
    last_reception_duration: Option<Duration>,
    updates: u64,
}

impl TrajectoryStats {
    pub fn absent(timestamp: SystemTime) -> Self {
        Self {
            latency: Stat::absent(timestamp),
            byte_loss: Stat::absent(timestamp),
            packet_loss: Stat::absent(timestamp),
            data_goodput: Stat::absent(timestamp),
            packet_goodput: Stat::absent(timestamp),
            data_rates: Sides::absent(timestamp),
            packet_rates: Sides::absent(timestamp),
            unmatched_data_rates: Sides::absent(timestamp),
            unmatched_packet_rates: Sides::absent(timestamp),
            last_round_duration: None,
            last_transmission_duration: None,
            last_reception_duration: None,
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

    /// data correctly delivered end to end
    pub fn data_goodput(&self) -> Stat<DataRate> {
        self.data_goodput
    }

    /// packets correctly delivered end to end
    pub fn packet_goodput(&self) -> Stat<PacketRate> {
        self.packet_goodput
    }

    pub fn data_transmission_rate(&self) -> Stat<DataRate> {
        self.data_rates.transmission
    }

    pub fn data_reception_rate(&self) -> Stat<DataRate> {
        self.data_rates.reception
    }

    pub fn packet_transmission_rate(&self) -> Stat<PacketRate> {
        self.packet_rates.transmission
    }

    pub fn packet_reception_rate(&self) -> Stat<PacketRate> {
        self.packet_rates.reception
    }

    pub fn unmatched_data_transmission_rate(&self) -> Stat<DataRate> {
        self.unmatched_data_rates.transmission
    }

    pub fn unmatched_data_reception_rate(&self) -> Stat<DataRate> {
        self.unmatched_data_rates.reception
    }

    pub fn unmatched_packet_transmission_rate(&self) -> Stat<PacketRate> {
        self.unmatched_packet_rates.transmission
    }

    pub fn unmatched_packet_reception_rate(&self) -> Stat<PacketRate> {
        self.unmatched_packet_rates.reception
    }

    /// the whole collection round
    pub fn last_round_duration(&self) -> Option<Duration> {
        self.last_round_duration
    }

    /// the span of the source captures of the last round
    pub fn last_transmission_duration(&self) -> Option<Duration> {
        self.last_transmission_duration
    }

    /// the span of the destination captures of the last round
    pub fn last_reception_duration(&self) -> Option<Duration> {
        self.last_reception_duration
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl CoreStats for TrajectoryStats {
    fn has_same_core_stats(&self, other: &Self) -> bool {
        self.latency.has_same_core(&other.latency)
            && self.byte_loss.has_same_core(&other.byte_loss)
            && self.packet_loss.has_same_core(&other.packet_loss)
            && self.data_goodput.has_same_core(&other.data_goodput)
            && self.packet_goodput.has_same_core(&other.packet_goodput)
            && self.data_rates.has_same_core(&other.data_rates)
            && self.packet_rates.has_same_core(&other.packet_rates)
            && self
                .unmatched_data_rates
                .has_same_core(&other.unmatched_data_rates)
            && self
                .unmatched_packet_rates
                .has_same_core(&other.unmatched_packet_rates)
    }
}

#[derive(Debug, Clone)]
pub struct TrajectoryBuilder {
    latency: HysteresisSeries<Latency>,
    byte_loss: HysteresisSeries<Ratio>,
    packet_loss: HysteresisSeries<Ratio>,
    data_goodput: HysteresisRate<DataRate>,
    packet_goodput: HysteresisRate<PacketRate>,
    data_rates: Sides<HysteresisRate<DataRate>>,
    packet_rates: Sides<HysteresisRate<PacketRate>>,
    unmatched_data_rates: Sides<HysteresisRate<DataRate>>,
    unmatched_packet_rates: Sides<HysteresisRate<PacketRate>>,
    last_round_duration: Option<Duration>,
    last_transmission_duration: Option<Duration>,
    last_reception_duration: Option<Duration>,
    updates: u64,
}

impl TrajectoryBuilder {
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
            data_goodput: HysteresisRate::new(factor, now),
            packet_goodput: HysteresisRate::new(factor, now),
            data_rates: Sides::new(factor, now),
            packet_rates: Sides::new(factor, now),
            unmatched_data_rates: Sides::new(factor, now),
            unmatched_packet_rates: Sides::new(factor, now),
            last_round_duration: None,
            last_transmission_duration: None,
            last_reception_duration: None,
            updates: 0,
        }
    }

    pub fn apply(&mut self, update: Update<TrajectoryRound>) {
        match update {
            Update::Clear => self.clear(SystemTime::now()),
            Update::Round(round) => self.collect(round),
        }
        self.updates = self.updates.saturating_add(1);
    }

    fn clear(&mut self, now: SystemTime) {
        self.latency.reset(now);
        self.byte_loss.reset(now);
        self.packet_loss.reset(now);
        self.data_goodput.reset(now);
        self.packet_goodput.reset(now);
        self.data_rates.reset(now);
        self.packet_rates.reset(now);
        self.unmatched_data_rates.reset(now);
        self.unmatched_packet_rates.reset(now);
        self.last_round_duration = None;
        self.last_transmission_duration = None;
        self.last_reception_duration = None;
    }

    fn collect(&mut self, round: TrajectoryRound) {
        let at = round.timestamp;

        if round.latencies.is_empty() {
            self.latency.reset(at);
        } else {
            self.latency.extend(round.latencies, at);
        }
        match round.byte_loss {
            Some(loss) => self.byte_loss.add(loss, at),
            None => self.byte_loss.reset(at),
        }
        match round.packet_loss {
            Some(loss) => self.packet_loss.add(loss, at),
            None => self.packet_loss.reset(at),
        }

        self.data_goodput.set(round.data_goodput, at);
        self.packet_goodput.set(round.packet_goodput, at);
        self.data_rates.set(round.data_rates, at);
        self.packet_rates.set(round.packet_rates, at);
        self.unmatched_data_rates.set(round.unmatched_data_rates, at);
        self.unmatched_packet_rates
            .set(round.unmatched_packet_rates, at);

        self.last_round_duration = Some(round.round_duration);
        self.last_transmission_duration = Some(round.transmission_duration);
        self.last_reception_duration = Some(round.reception_duration);
    }
}

impl StatsBuilder for TrajectoryBuilder {
    type Stats = TrajectoryStats;

    fn build(&self) -> TrajectoryStats {
        TrajectoryStats {
            latency: Stat::from_timed(self.latency.summary(), Trust::Safe),
            byte_loss: Stat::from_timed(self.byte_loss.summary(), Trust::Safe),
            packet_loss: Stat::from_timed(self.packet_loss.summary(), Trust::Safe),
            data_goodput: Stat::from_timed(self.data_goodput.rate(), Trust::Safe),
            packet_goodput: Stat::from_timed(self.packet_goodput.rate(), Trust::Safe),
            data_rates: self.data_rates.build(),
            packet_rates: self.packet_rates.build(),
            unmatched_data_rates: self.unmatched_data_rates.build(),
            unmatched_packet_rates: self.unmatched_packet_rates.build(),
            last_round_duration: self.last_round_duration,
            last_transmission_duration: self.last_transmission_duration,
            last_reception_duration: self.last_reception_duration,
            updates: self.updates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> TrajectoryBuilder {
        let window = NonZeroUsize::new(3).unwrap();
        TrajectoryBuilder::new(window, window, ThresholdFactor::default())
    }

    fn round(latencies: &[u64], loss: Option<f64>) -> TrajectoryRound {
        let loss = loss.map(|loss| Ratio::new(loss).unwrap());
        TrajectoryRound {
            latencies: latencies
                .iter()
                .map(|ms| Latency::new(Duration::from_millis(*ms)))
                .collect(),
            byte_loss: loss,
            packet_loss: loss,
            data_goodput: Some(DataRate::from_bits_per_second(1_000.0)),
            packet_goodput: Some(PacketRate::from_packets_per_second(1.0)),
            data_rates: Rates {
                transmission: Some(DataRate::from_bits_per_second(2_000.0)),
                reception: None,
            },
            packet_rates: Rates::default(),
            unmatched_data_rates: Rates::default(),
            unmatched_packet_rates: Rates::default(),
            round_duration: Duration::from_secs(10),
            transmission_duration: Duration::from_secs(8),
            reception_duration: Duration::from_secs(9),
            timestamp: SystemTime::now(),
        }
    }

    #[test]
    fn all_round_latencies_enter_the_window() {
        let mut builder = builder();
        builder.apply(Update::Round(round(&[10, 20, 30], Some(0.0))));

        let stats = builder.build();
        let latency = stats.latency().get().unwrap();
        assert_eq!(latency.mean(), Latency::new(Duration::from_millis(20)));
        assert_eq!(latency.latest(), Latency::new(Duration::from_millis(30)));
        assert!(stats.latency().is_safe());
    }

    #[test]
    fn no_correct_packet_resets_latency() {
        let mut builder = builder();
        builder.apply(Update::Round(round(&[10], Some(0.0))));
        builder.apply(Update::Round(round(&[], Some(1.0))));

        let stats = builder.build();
        assert!(!stats.latency().is_present());
        assert!(stats.packet_loss().is_present());
    }

    #[test]
    fn round_fields() {
        let mut builder = builder();
        builder.apply(Update::Round(round(&[10], None)));

        let stats = builder.build();
        assert!(!stats.byte_loss().is_present());
        assert_eq!(
            stats.data_transmission_rate().get(),
            Some(DataRate::from_bits_per_second(2_000.0))
        );
        assert!(!stats.data_reception_rate().is_present());
        assert_eq!(
            stats.data_goodput().get(),
            Some(DataRate::from_bits_per_second(1_000.0))
        );
        assert_eq!(stats.last_round_duration(), Some(Duration::from_secs(10)));
        assert_eq!(
            stats.last_transmission_duration(),
            Some(Duration::from_secs(8))
        );
        assert_eq!(stats.last_reception_duration(), Some(Duration::from_secs(9)));
    }

    #[test]
    fn clear() {
        let mut builder = builder();
        builder.apply(Update::Round(round(&[10], Some(0.5))));
        builder.apply(Update::Clear);

        let stats = builder.build();
        assert!(stats.has_same_core_stats(&TrajectoryStats::absent(SystemTime::now())));
        assert_eq!(stats.last_round_duration(), None);
        assert_eq!(stats.updates(), 2);
    }
}
