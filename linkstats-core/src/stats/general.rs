use crate::{
    link::DatapathLink,
    measure::{DataRate, Latency, PacketRate, Ratio},
    stat::{Stat, Trust},
    stats::{CoreStats, LinkConfigStats, LldpProbingStats, SecureProbingStats, SwitchesStats},
    summary::Summary,
};
use std::{fmt, sync::Arc, time::SystemTime};

/// Frozen statistics of a link
///
/// Cloning is cheap: the sub-statistics are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralLinkStats {
    link: DatapathLink,
    link_config: Arc<LinkConfigStats>,
    switches: Arc<SwitchesStats>,
    lldp_probing: Arc<LldpProbingStats>,
    secure_probing: Arc<SecureProbingStats>,
}

impl GeneralLinkStats {
    pub fn new(
        link: DatapathLink,
        link_config: Arc<LinkConfigStats>,
        switches: Arc<SwitchesStats>,
        lldp_probing: Arc<LldpProbingStats>,
        secure_probing: Arc<SecureProbingStats>,
    ) -> Self {
        Self {
            link,
            link_config,
            switches,
            lldp_probing,
            secure_probing,
        }
    }

    pub fn absent(link: DatapathLink) -> Self {
        let now = SystemTime::now();
        Self::new(
            link,
            Arc::new(LinkConfigStats::absent(now)),
            Arc::new(SwitchesStats::absent(now)),
            Arc::new(LldpProbingStats::absent(now)),
            Arc::new(SecureProbingStats::absent(now)),
        )
    }

    #[inline]
    pub fn link(&self) -> DatapathLink {
        self.link
    }

    pub fn link_config(&self) -> &LinkConfigStats {
        &self.link_config
    }

    pub fn switches(&self) -> &SwitchesStats {
        &self.switches
    }

    pub fn lldp_probing(&self) -> &LldpProbingStats {
        &self.lldp_probing
    }

    pub fn secure_probing(&self) -> &SecureProbingStats {
        &self.secure_probing
    }

    /// the virtual capacity if any, otherwise the physical one
    pub fn data_capacity(&self) -> Stat<DataRate> {
        self.link_config.data_capacity()
    }

    /// the secure probing latency if any, otherwise the LLDP one
    pub fn latency(&self) -> Stat<Summary<Latency>> {
        self.secure_probing
            .latency()
            .or(self.lldp_probing.latency())
    }

    pub fn byte_loss(&self) -> Stat<Summary<Ratio>> {
        self.secure_probing.byte_loss()
    }

    pub fn packet_loss(&self) -> Stat<Summary<Ratio>> {
        self.secure_probing.packet_loss()
    }

    pub fn source_packet_drop_rate(&self) -> Stat<Summary<PacketRate>> {
        self.switches.source_packet_drop_rate()
    }

    pub fn destination_packet_drop_rate(&self) -> Stat<Summary<PacketRate>> {
        self.switches.destination_packet_drop_rate()
    }

    /// what is left of the capacity once `used` is taken
    pub fn available_bandwidth(&self, used: Stat<DataRate>) -> Stat<DataRate> {
        available_bandwidth(self.data_capacity(), used)
    }

    /// the fraction of the capacity taken by `used`
    pub fn data_utilization(&self, used: Stat<DataRate>) -> Stat<Ratio> {
        data_utilization(self.data_capacity(), used)
    }

    /// number of updates of all the sub-statistics
    pub fn total_updates(&self) -> u64 {
        [
            self.link_config.updates(),
            self.switches.updates(),
            self.lldp_probing.updates(),
            self.secure_probing.updates(),
        ]
        .into_iter()
        .fold(0, u64::saturating_add)
    }
}

fn combined_trust(a: Trust, b: Trust) -> Trust {
    if a == Trust::Safe && b == Trust::Safe {
        Trust::Safe
    } else {
        Trust::Unsafe
    }
}

pub(crate) fn available_bandwidth(capacity: Stat<DataRate>, used: Stat<DataRate>) -> Stat<DataRate> {
    let value = capacity
        .get()
        .zip(used.get())
        .map(|(capacity, used)| capacity.saturating_sub(used));
    Stat::new(
        value,
        used.timestamp(),
        combined_trust(capacity.trust(), used.trust()),
    )
}

pub(crate) fn data_utilization(capacity: Stat<DataRate>, used: Stat<DataRate>) -> Stat<Ratio> {
    let value = capacity.get().zip(used.get()).and_then(|(capacity, used)| {
        Ratio::of(used.bits_per_second(), capacity.bits_per_second())
    });
    Stat::new(
        value,
        used.timestamp(),
        combined_trust(capacity.trust(), used.trust()),
    )
}

impl CoreStats for GeneralLinkStats {
    fn has_same_core_stats(&self, other: &Self) -> bool {
        self.link == other.link
            && self.link_config.has_same_core_stats(&other.link_config)
            && self.switches.has_same_core_stats(&other.switches)
            && self.lldp_probing.has_same_core_stats(&other.lldp_probing)
            && self.secure_probing.has_same_core_stats(&other.secure_probing)
    }
}

impl fmt::Display for GeneralLinkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "link {}", self.link)?;
        writeln!(
            f,
            "  capacity:        {} (physical {})",
            self.data_capacity(),
            self.link_config.physical_capacity()
        )?;
        writeln!(f, "  latency:         {}", self.latency())?;
        writeln!(f, "  byte loss:       {}", self.byte_loss())?;
        writeln!(f, "  packet loss:     {}", self.packet_loss())?;
        writeln!(
            f,
            "  drop rates:      {} / {}",
            self.source_packet_drop_rate(),
            self.destination_packet_drop_rate()
        )?;
        write!(f, "  updates:         {}", self.total_updates())
    }
}
