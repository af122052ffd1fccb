//! Translation of raw samples into per-round statistics.
//!
//! Every function here is pure: it looks at one sample and tells the
//! matching sub-stat builder what to do with it, either clear itself
//! (the sample has no results) or absorb one round of values.

use crate::{
    measure::{DataRate, Latency, PacketRate, Ratio},
    sample::{
        FlowCounters, LldpProbingSample, PacketSummary, SecureProbingSample, SwitchCounterSample,
        TimedPacketSummary, TrajectorySample,
    },
    stat::Timed,
};
use log::{trace, warn};
use std::{
    collections::HashMap,
    time::{Duration, SystemTime},
};

/// What a sub-stat builder must do with a sample
#[derive(Debug, Clone, PartialEq)]
pub enum Update<R> {
    /// no measurement this round: drop the current values
    Clear,
    Round(R),
}

impl<R> Update<R> {
    pub fn round(&self) -> Option<&R> {
        match self {
            Self::Clear => None,
            Self::Round(round) => Some(round),
        }
    }
}

/// One secure probe round
///
/// `latency` is absent when the probe was lost or its delay was
/// negative. The losses are absent when no probe left the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SecureProbingRound {
    pub latency: Option<Latency>,
    pub byte_loss: Option<Ratio>,
    pub packet_loss: Option<Ratio>,
    pub timestamp: SystemTime,
}

/// Rates derived from the flow counters of both ends of a flowed link
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCounterRound {
    pub data_transmission_rate: Timed<Option<DataRate>>,
    pub data_reception_rate: Timed<Option<DataRate>>,
    pub packet_transmission_rate: Timed<Option<PacketRate>>,
    pub packet_reception_rate: Timed<Option<PacketRate>>,
    pub round_duration: Duration,
}

/// A rate at the source and at the destination of a flowed link
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rates<T> {
    pub transmission: Option<T>,
    pub reception: Option<T>,
}

/// Everything learned from one round of mirrored packets
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryRound {
    /// delays of the correctly received packets, in map order
    pub latencies: Vec<Latency>,
    pub byte_loss: Option<Ratio>,
    pub packet_loss: Option<Ratio>,
    pub data_goodput: Option<DataRate>,
    pub packet_goodput: Option<PacketRate>,
    pub data_rates: Rates<DataRate>,
    pub packet_rates: Rates<PacketRate>,
    pub unmatched_data_rates: Rates<DataRate>,
    pub unmatched_packet_rates: Rates<PacketRate>,
    pub round_duration: Duration,
    /// tight duration of the source summaries
    pub transmission_duration: Duration,
    /// tight duration of the destination summaries
    pub reception_duration: Duration,
    pub timestamp: SystemTime,
}

pub fn lldp_probing(sample: &LldpProbingSample) -> Update<Timed<Latency>> {
    let link = sample.link();
    match sample.result() {
        None => {
            trace!("Resetting LLDP-probing sub-statistics for datapath-link {link}");
            Update::Clear
        }
        Some(latency) => {
            trace!("Calculating LLDP-probing sub-statistics for datapath-link {link}");
            Update::Round(*latency)
        }
    }
}

pub fn secure_probing(sample: &SecureProbingSample) -> Update<SecureProbingRound> {
    let link = sample.link();
    let Some(result) = sample.result() else {
        trace!("Resetting secure-probing sub-statistics for datapath-link {link}");
        return Update::Clear;
    };
    trace!("Calculating secure-probing sub-statistics for datapath-link {link}");

    let mut transmitted = (0, 0);
    let mut correct = (0, 0);
    let mut latency = None;

    if let Some(source) = &result.source {
        transmitted = (u64::from(source.value().length()), 1);

        if let Some(destination) = &result.destination
            && source.value() == destination.value()
        {
            match destination.timestamp().duration_since(source.timestamp()) {
                Ok(delay) => {
                    latency = Some(Latency::new(delay));
                    correct = (u64::from(destination.value().length()), 1);
                }
                Err(error) => warn!(
                    "Found negative delay of -{:?} in secure-probing sample for link {link}",
                    error.duration()
                ),
            }
        }
    }

    Update::Round(SecureProbingRound {
        latency,
        byte_loss: Ratio::lost(transmitted.0, correct.0),
        packet_loss: Ratio::lost(transmitted.1, correct.1),
        timestamp: result.collect_finished,
    })
}

pub fn switch_counter(sample: &SwitchCounterSample) -> Update<SwitchCounterRound> {
    let link = sample.link();
    let Some(result) = sample.result() else {
        trace!("Resetting switch-counter sub-statistics for flowed-link {link}");
        return Update::Clear;
    };
    trace!("Calculating switch-counter sub-statistics for flowed-link {link}");

    let duration = result.sampling_duration;
    let source = &result.source;
    let destination = &result.destination;

    let bytes = |counters: &Timed<FlowCounters>, end: &str| {
        let bytes = counters.value().bytes();
        if bytes.is_none() {
            trace!("flow byte count is not supported at the {end} of {link}");
        }
        let rate = bytes.and_then(|bytes| DataRate::checked_over(bytes, duration));
        Timed::new(rate, counters.timestamp())
    };
    let packets = |counters: &Timed<FlowCounters>, end: &str| {
        let packets = counters.value().packets();
        if packets.is_none() {
            trace!("flow packet count is not supported at the {end} of {link}");
        }
        let rate = packets.and_then(|packets| PacketRate::checked_over(packets, duration));
        Timed::new(rate, counters.timestamp())
    };

    Update::Round(SwitchCounterRound {
        data_transmission_rate: bytes(source, "source"),
        data_reception_rate: bytes(destination, "destination"),
        packet_transmission_rate: packets(source, "source"),
        packet_reception_rate: packets(destination, "destination"),
        round_duration: duration,
    })
}

/// source and destination capture times of one packet content
#[derive(Default)]
struct PacketTimes {
    length: u32,
    source: Vec<SystemTime>,
    destination: Vec<SystemTime>,
}

/// span between the first and the last instant, if positive
fn tight_duration<I>(times: I) -> Option<Duration>
where
    I: IntoIterator<Item = SystemTime>,
{
    let mut times = times.into_iter();
    let first = times.next()?;
    let last = times.last()?;
    last.duration_since(first)
        .ok()
        .filter(|duration| !duration.is_zero())
}

pub fn trajectory(sample: &TrajectorySample) -> Update<TrajectoryRound> {
    let link = sample.link();
    let Some(result) = sample.result() else {
        trace!("Resetting trajectory sub-statistics for flowed-link {link}");
        return Update::Clear;
    };
    trace!("Calculating trajectory sub-statistics for flowed-link {link}");

    let mut transmitted = (0u64, 0u64);
    let mut received = (0u64, 0u64);
    let mut correct = (0u64, 0u64);

    // packet contents in order of first appearance at the source
    let mut index: HashMap<&PacketSummary, usize> =
        HashMap::with_capacity(result.source_summaries.len());
    let mut packets: Vec<PacketTimes> = Vec::with_capacity(result.source_summaries.len());

    for summary in &result.source_summaries {
        let packet = summary.value();
        let position = *index.entry(packet).or_insert_with(|| {
            packets.push(PacketTimes {
                length: packet.length(),
                ..PacketTimes::default()
            });
            packets.len() - 1
        });
        packets[position].source.push(summary.timestamp());

        transmitted.0 += u64::from(packet.length());
        transmitted.1 += 1;
    }

    for summary in &result.destination_summaries {
        let packet = summary.value();
        if let Some(&position) = index.get(packet) {
            packets[position].destination.push(summary.timestamp());
        }

        received.0 += u64::from(packet.length());
        received.1 += 1;
    }

    let mut latencies = Vec::new();
    let mut correct_times = Vec::new();
    for times in &packets {
        // the i-th capture at the source is assumed to be the i-th one
        // at the destination
        for (&source, &destination) in times.source.iter().zip(&times.destination) {
            match destination.duration_since(source) {
                Ok(delay) => {
                    correct.0 += u64::from(times.length);
                    correct.1 += 1;
                    latencies.push(Latency::new(delay));
                    correct_times.push(destination);
                }
                Err(error) => warn!(
                    "Found negative delay of -{:?} in trajectory sample for flowed-link {link}",
                    error.duration()
                ),
            }
        }
    }

    let collect = result.collect_duration;
    let timestamps = |summaries: &[TimedPacketSummary]| {
        tight_duration(summaries.iter().map(TimedPacketSummary::timestamp)).unwrap_or(collect)
    };
    let transmission = timestamps(&result.source_summaries);
    let reception = timestamps(&result.destination_summaries);
    let goodput = tight_duration(correct_times).unwrap_or(collect);

    let unmatched_tx = result.source_unmatched;
    let unmatched_rx = result.destination_unmatched;

    Update::Round(TrajectoryRound {
        latencies,
        byte_loss: Ratio::lost(transmitted.0, correct.0),
        packet_loss: Ratio::lost(transmitted.1, correct.1),
        data_goodput: DataRate::checked_over(correct.0, goodput),
        packet_goodput: PacketRate::checked_over(correct.1, goodput),
        data_rates: Rates {
            transmission: DataRate::checked_over(transmitted.0, transmission),
            reception: DataRate::checked_over(received.0, reception),
        },
        packet_rates: Rates {
            transmission: PacketRate::checked_over(transmitted.1, transmission),
            reception: PacketRate::checked_over(received.1, reception),
        },
        unmatched_data_rates: Rates {
            transmission: DataRate::checked_over(unmatched_tx.bytes, transmission),
            reception: DataRate::checked_over(unmatched_rx.bytes, reception),
        },
        unmatched_packet_rates: Rates {
            transmission: PacketRate::checked_over(unmatched_tx.packets, transmission),
            reception: PacketRate::checked_over(unmatched_rx.packets, reception),
        },
        round_duration: collect,
        transmission_duration: transmission,
        reception_duration: reception,
        timestamp: result.collect_finished,
    })
}
