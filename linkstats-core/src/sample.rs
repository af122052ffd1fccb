//! Raw measurement samples, one per measurement round.
//!
//! A sample always names the link it concerns. A round without any
//! measurement is signalled with a sample without results, never with
//! placeholder values.

use crate::{
    link::{DatapathLink, FlowedLink},
    measure::Latency,
    stat::Timed,
};
use std::{
    hash::{Hash, Hasher},
    time::{Duration, SystemTime},
};

/// Digest of a packet observed on the wire
///
/// Two summaries designate the same packet content when their digests
/// are equal, the length is informative only.
#[derive(Debug, Clone, Copy)]
pub struct PacketSummary {
    digest: u64,
    length: u32,
}

impl PacketSummary {
    pub const fn new(digest: u64, length: u32) -> Self {
        Self { digest, length }
    }

    #[inline]
    pub const fn digest(&self) -> u64 {
        self.digest
    }

    /// length of the packet, in bytes
    #[inline]
    pub const fn length(&self) -> u32 {
        self.length
    }
}

impl PartialEq for PacketSummary {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for PacketSummary {}

impl Hash for PacketSummary {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}

/// A [`PacketSummary`] and the instant the packet was captured
pub type TimedPacketSummary = Timed<PacketSummary>;

/// Byte and packet counters of a flow entry, as reported by a switch
///
/// Switches that do not support a counter report it as
/// [`FlowCounters::NOT_SUPPORTED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowCounters {
    pub byte_count: u64,
    pub packet_count: u64,
}

impl FlowCounters {
    pub const NOT_SUPPORTED: u64 = u64::MAX;

    pub const fn new(byte_count: u64, packet_count: u64) -> Self {
        Self {
            byte_count,
            packet_count,
        }
    }

    pub fn bytes(&self) -> Option<u64> {
        (self.byte_count != Self::NOT_SUPPORTED).then_some(self.byte_count)
    }

    pub fn packets(&self) -> Option<u64> {
        (self.packet_count != Self::NOT_SUPPORTED).then_some(self.packet_count)
    }
}

/// An amount of traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrafficCount {
    pub bytes: u64,
    pub packets: u64,
}

impl TrafficCount {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(bytes: u64, packets: u64) -> Self {
        Self { bytes, packets }
    }
}

/// Latency of a link measured with LLDP probes
#[derive(Debug, Clone)]
pub struct LldpProbingSample {
    link: DatapathLink,
    result: Option<Timed<Latency>>,
}

impl LldpProbingSample {
    pub fn new(link: DatapathLink, latency: Timed<Latency>) -> Self {
        Self {
            link,
            result: Some(latency),
        }
    }

    pub fn no_results(link: DatapathLink) -> Self {
        Self { link, result: None }
    }

    #[inline]
    pub fn link(&self) -> DatapathLink {
        self.link
    }

    pub fn result(&self) -> Option<&Timed<Latency>> {
        self.result.as_ref()
    }
}

/// One authenticated probe, as captured at both ends of a link
#[derive(Debug, Clone)]
pub struct SecureProbingResult {
    /// the probe as it left the source switch, if it was captured
    pub source: Option<TimedPacketSummary>,
    /// the probe as it reached the destination switch, if it did
    pub destination: Option<TimedPacketSummary>,
    pub collect_duration: Duration,
    pub collect_finished: SystemTime,
}

#[derive(Debug, Clone)]
pub struct SecureProbingSample {
    link: DatapathLink,
    result: Option<SecureProbingResult>,
}

impl SecureProbingSample {
    pub fn new(link: DatapathLink, result: SecureProbingResult) -> Self {
        Self {
            link,
            result: Some(result),
        }
    }

    pub fn no_results(link: DatapathLink) -> Self {
        Self { link, result: None }
    }

    #[inline]
    pub fn link(&self) -> DatapathLink {
        self.link
    }

    pub fn result(&self) -> Option<&SecureProbingResult> {
        self.result.as_ref()
    }
}

/// Flow counters collected at both ends of a flowed link after a
/// sampling period
#[derive(Debug, Clone)]
pub struct SwitchCounterResult {
    pub source: Timed<FlowCounters>,
    pub destination: Timed<FlowCounters>,
    pub sampling_duration: Duration,
}

#[derive(Debug, Clone)]
pub struct SwitchCounterSample {
    link: FlowedLink,
    result: Option<SwitchCounterResult>,
}

impl SwitchCounterSample {
    pub fn new(link: FlowedLink, result: SwitchCounterResult) -> Self {
        Self {
            link,
            result: Some(result),
        }
    }

    pub fn no_results(link: FlowedLink) -> Self {
        Self { link, result: None }
    }

    #[inline]
    pub fn link(&self) -> &FlowedLink {
        &self.link
    }

    pub fn result(&self) -> Option<&SwitchCounterResult> {
        self.result.as_ref()
    }
}

/// Mirrored packets of a flow, captured at both ends of a link during
/// one collection round
#[derive(Debug, Clone)]
pub struct TrajectoryResult {
    /// in capture order
    pub source_summaries: Vec<TimedPacketSummary>,
    /// traffic seen at the source but not summarized
    pub source_unmatched: TrafficCount,
    /// in capture order
    pub destination_summaries: Vec<TimedPacketSummary>,
    /// traffic seen at the destination but not summarized
    pub destination_unmatched: TrafficCount,
    pub collect_duration: Duration,
    pub collect_finished: SystemTime,
}

#[derive(Debug, Clone)]
pub struct TrajectorySample {
    link: FlowedLink,
    result: Option<TrajectoryResult>,
}

impl TrajectorySample {
    pub fn new(link: FlowedLink, result: TrajectoryResult) -> Self {
        Self {
            link,
            result: Some(result),
        }
    }

    pub fn no_results(link: FlowedLink) -> Self {
        Self { link, result: None }
    }

    #[inline]
    pub fn link(&self) -> &FlowedLink {
        &self.link
    }

    pub fn result(&self) -> Option<&TrajectoryResult> {
        self.result.as_ref()
    }
}

/// A sample about a whole link
#[derive(Debug, Clone)]
pub enum GeneralSample {
    Lldp(LldpProbingSample),
    Secure(SecureProbingSample),
}

impl GeneralSample {
    pub fn link(&self) -> DatapathLink {
        match self {
            Self::Lldp(sample) => sample.link(),
            Self::Secure(sample) => sample.link(),
        }
    }

    pub fn has_results(&self) -> bool {
        match self {
            Self::Lldp(sample) => sample.result().is_some(),
            Self::Secure(sample) => sample.result().is_some(),
        }
    }
}

impl From<LldpProbingSample> for GeneralSample {
    fn from(sample: LldpProbingSample) -> Self {
        Self::Lldp(sample)
    }
}

impl From<SecureProbingSample> for GeneralSample {
    fn from(sample: SecureProbingSample) -> Self {
        Self::Secure(sample)
    }
}

/// A sample about one flow of a link
#[derive(Debug, Clone)]
pub enum FlowedSample {
    SwitchCounter(SwitchCounterSample),
    Trajectory(TrajectorySample),
}

impl FlowedSample {
    pub fn link(&self) -> &FlowedLink {
        match self {
            Self::SwitchCounter(sample) => sample.link(),
            Self::Trajectory(sample) => sample.link(),
        }
    }

    pub fn has_results(&self) -> bool {
        match self {
            Self::SwitchCounter(sample) => sample.result().is_some(),
            Self::Trajectory(sample) => sample.result().is_some(),
        }
    }
}

impl From<SwitchCounterSample> for FlowedSample {
    fn from(sample: SwitchCounterSample) -> Self {
        Self::SwitchCounter(sample)
    }
}

impl From<TrajectorySample> for FlowedSample {
    fn from(sample: TrajectorySample) -> Self {
        Self::Trajectory(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_identity_is_the_digest() {
        assert_eq!(PacketSummary::new(7, 100), PacketSummary::new(7, 64));
        assert_ne!(PacketSummary::new(7, 100), PacketSummary::new(8, 100));
    }

    #[test]
    fn unsupported_counters() {
        let counters = FlowCounters::new(FlowCounters::NOT_SUPPORTED, 12);
        assert_eq!(counters.bytes(), None);
        assert_eq!(counters.packets(), Some(12));
    }
}
