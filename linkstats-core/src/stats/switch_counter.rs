use crate::{
    calculator::{SwitchCounterRound, Update},
    measure::{DataRate, Metric, PacketRate, Ratio},
    stat::{Stat, Timed, Trust},
    stats::{CoreStats, StatsBuilder},
    summary::{HysteresisRate, ThresholdFactor},
};
use std::time::{Duration, SystemTime};

/// Rates of a flow as counted by the switches at both ends of a link
///
/// Switch counters are not authenticated, every value is
/// [`Trust::Unsafe`].
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCounterStats {
    data_transmission_rate: Stat<DataRate>,
    data_reception_rate: Stat<DataRate>,
    packet_transmission_rate: Stat<PacketRate>,
    packet_reception_rate: Stat<PacketRate>,
    last_round_duration: Option<Duration>,
    updates: u64,
}

impl SwitchCounterStats {
    pub fn absent(timestamp: SystemTime) -> Self {
        Self {
            data_transmission_rate: Stat::absent(timestamp),
            data_reception_rate: Stat::absent(timestamp),
            packet_transmission_rate: Stat::absent(timestamp),
            packet_reception_rate: Stat::absent(timestamp),
            last_round_duration: None,
            updates: 0,
        }
    }

    pub fn data_transmission_rate(&self) -> Stat<DataRate> {
        self.data_transmission_rate
    }

    pub fn data_reception_rate(&self) -> Stat<DataRate> {
        self.data_reception_rate
    }

    pub fn packet_transmission_rate(&self) -> Stat<PacketRate> {
        self.packet_transmission_rate
    }

    pub fn packet_reception_rate(&self) -> Stat<PacketRate> {
        self.packet_reception_rate
    }

    /// the data received at the destination
    pub fn data_throughput(&self) -> Stat<DataRate> {
        self.data_reception_rate
    }

    /// the packets received at the destination
    pub fn packet_throughput(&self) -> Stat<PacketRate> {
        self.packet_reception_rate
    }

    pub fn byte_loss(&self) -> Stat<Ratio> {
        loss(self.data_transmission_rate, self.data_reception_rate)
    }

    pub fn packet_loss(&self) -> Stat<Ratio> {
        loss(self.packet_transmission_rate, self.packet_reception_rate)
    }

    pub fn last_round_duration(&self) -> Option<Duration> {
        self.last_round_duration
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

/// `(tx - rx)⁺ / tx`, absent if either rate is absent or nothing was
/// transmitted
fn loss<T: Metric>(transmission: Stat<T>, reception: Stat<T>) -> Stat<Ratio> {
    let ratio = transmission.get().zip(reception.get()).and_then(|(tx, rx)| {
        let tx = tx.into_f64();
        Ratio::of((tx - rx.into_f64()).max(0.0), tx)
    });
    Stat::new(ratio, reception.timestamp(), Trust::Unsafe)
}

impl CoreStats for SwitchCounterStats {
    fn has_same_core_stats(&self, other: &Self) -> bool {
        self.data_transmission_rate
            .has_same_core(&other.data_transmission_rate)
            && self
                .data_reception_rate
                .has_same_core(&other.data_reception_rate)
            && self
                .packet_transmission_rate
                .has_same_core(&other.packet_transmission_rate)
            && self
                .packet_reception_rate
                .has_same_core(&other.packet_reception_rate)
    }
}

#[derive(Debug, Clone)]
pub struct SwitchCounterBuilder {
    data_transmission_rate: HysteresisRate<DataRate>,
    data_reception_rate: HysteresisRate<DataRate>,
    packet_transmission_rate: HysteresisRate<PacketRate>,
    packet_reception_rate: HysteresisRate<PacketRate>,
    last_round_duration: Option<Duration>,
    updates: u64,
}

impl SwitchCounterBuilder {
    pub fn new(factor: ThresholdFactor) -> Self {
        let now = SystemTime::now();
        Self {
            data_transmission_rate: HysteresisRate::new(factor, now),
            data_reception_rate: HysteresisRate::new(factor, now),
            packet_transmission_rate: HysteresisRate::new(factor, now),
            packet_reception_rate: HysteresisRate::new(factor, now),
            last_round_duration: None,
            updates: 0,
        }
    }

    pub fn apply(&mut self, update: Update<SwitchCounterRound>) {
        match update {
            Update::Clear => {
                let now = SystemTime::now();
                self.data_transmission_rate.reset(now);
                self.data_reception_rate.reset(now);
                self.packet_transmission_rate.reset(now);
                self.packet_reception_rate.reset(now);
                self.last_round_duration = None;
            }
            Update::Round(round) => {
                set(&mut self.data_transmission_rate, round.data_transmission_rate);
                set(&mut self.data_reception_rate, round.data_reception_rate);
                set(&mut self.packet_transmission_rate, round.packet_transmission_rate);
                set(&mut self.packet_reception_rate, round.packet_reception_rate);
                self.last_round_duration = Some(round.round_duration);
            }
        }
        self.updates = self.updates.saturating_add(1);
    }
}

fn set<T: Metric>(rate: &mut HysteresisRate<T>, value: Timed<Option<T>>) {
    rate.set(*value.value(), value.timestamp());
}

impl StatsBuilder for SwitchCounterBuilder {
    type Stats = SwitchCounterStats;

    fn build(&self) -> SwitchCounterStats {
        SwitchCounterStats {
            data_transmission_rate: Stat::from_timed(
                self.data_transmission_rate.rate(),
                Trust::Unsafe,
            ),
            data_reception_rate: Stat::from_timed(self.data_reception_rate.rate(), Trust::Unsafe),
            packet_transmission_rate: Stat::from_timed(
                self.packet_transmission_rate.rate(),
                Trust::Unsafe,
            ),
            packet_reception_rate: Stat::from_timed(
                self.packet_reception_rate.rate(),
                Trust::Unsafe,
            ),
            last_round_duration: self.last_round_duration,
            updates: self.updates,
        }
    }
}
