use crate::{
    link::{DatapathLink, Flow, FlowedLink},
    measure::{DataRate, Latency, Ratio},
    stat::Stat,
    stats::{
        CoreStats, GeneralLinkStats, SwitchCounterStats, TrajectoryStats,
        general::{available_bandwidth, data_utilization},
    },
    summary::Summary,
};
use std::{fmt, sync::Arc, time::SystemTime};

/// Frozen statistics of a flow on a link
///
/// Always carries the general statistics of its link as they were when
/// the flow statistics were frozen.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowedLinkStats {
    link: FlowedLink,
    switch_counter: Arc<SwitchCounterStats>,
    trajectory: Arc<TrajectoryStats>,
    general: GeneralLinkStats,
}

impl FlowedLinkStats {
    pub fn new(
        link: FlowedLink,
        switch_counter: Arc<SwitchCounterStats>,
        trajectory: Arc<TrajectoryStats>,
        general: GeneralLinkStats,
    ) -> Self {
        debug_assert_eq!(link.link(), general.link());
        Self {
            link,
            switch_counter,
            trajectory,
            general,
        }
    }

    pub fn absent(link: FlowedLink) -> Self {
        let now = SystemTime::now();
        let general = GeneralLinkStats::absent(link.link());
        Self::new(
            link,
            Arc::new(SwitchCounterStats::absent(now)),
            Arc::new(TrajectoryStats::absent(now)),
            general,
        )
    }

    #[inline]
    pub fn link(&self) -> &FlowedLink {
        &self.link
    }

    #[inline]
    pub fn datapath_link(&self) -> DatapathLink {
        self.link.link()
    }

    #[inline]
    pub fn flow(&self) -> &Flow {
        self.link.flow()
    }

    pub fn switch_counter(&self) -> &SwitchCounterStats {
        &self.switch_counter
    }

    pub fn trajectory(&self) -> &TrajectoryStats {
        &self.trajectory
    }

    pub fn general(&self) -> &GeneralLinkStats {
        &self.general
    }

    /// the trajectory latency if any, otherwise the link latency
    pub fn latency(&self) -> Stat<Summary<Latency>> {
        self.trajectory.latency().or(self.general.latency())
    }

    /// the trajectory goodput if any, otherwise the data received at
    /// the destination switch
    pub fn throughput(&self) -> Stat<DataRate> {
        self.trajectory
            .data_goodput()
            .or(self.switch_counter.data_throughput())
    }

    pub fn data_capacity(&self) -> Stat<DataRate> {
        self.general.data_capacity()
    }

    /// what is left of the link capacity once this flow is served
    pub fn available_bandwidth(&self) -> Stat<DataRate> {
        available_bandwidth(self.data_capacity(), self.throughput())
    }

    /// the fraction of the link capacity taken by this flow
    pub fn data_utilization(&self) -> Stat<Ratio> {
        data_utilization(self.data_capacity(), self.throughput())
    }

    /// trajectory loss, otherwise link loss, otherwise counter loss
    pub fn byte_loss(&self) -> Stat<Ratio> {
        self.trajectory
            .byte_loss()
            .map(|summary| summary.mean())
            .or(self.general.byte_loss().map(|summary| summary.mean()))
            .or(self.switch_counter.byte_loss())
    }

    /// trajectory loss, otherwise link loss, otherwise counter loss
    pub fn packet_loss(&self) -> Stat<Ratio> {
        self.trajectory
            .packet_loss()
            .map(|summary| summary.mean())
            .or(self.general.packet_loss().map(|summary| summary.mean()))
            .or(self.switch_counter.packet_loss())
    }

    /// updates of the flow sub-statistics and of the link ones
    pub fn total_updates(&self) -> u64 {
        self.switch_counter
            .updates()
            .saturating_add(self.trajectory.updates())
            .saturating_add(self.general.total_updates())
    }
}

impl CoreStats for FlowedLinkStats {
    fn has_same_core_stats(&self, other: &Self) -> bool {
        self.link == other.link
            && self
                .switch_counter
                .has_same_core_stats(&other.switch_counter)
            && self.trajectory.has_same_core_stats(&other.trajectory)
            && self.general.has_same_core_stats(&other.general)
    }
}

impl fmt::Display for FlowedLinkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "flow {}", self.link)?;
        writeln!(f, "  latency:         {}", self.latency())?;
        writeln!(f, "  throughput:      {}", self.throughput())?;
        writeln!(f, "  available:       {}", self.available_bandwidth())?;
        writeln!(f, "  utilization:     {}", self.data_utilization())?;
        writeln!(f, "  byte loss:       {}", self.byte_loss())?;
        writeln!(f, "  packet loss:     {}", self.packet_loss())?;
        write!(f, "  updates:         {}", self.total_updates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calculator::{SwitchCounterRound, Update},
        measure::PacketRate,
        node::{NodeId, NodePort, PortId},
        stat::Timed,
        stats::{StatsBuilder, SwitchCounterBuilder},
        summary::ThresholdFactor,
    };
    use std::time::Duration;

    fn flowed() -> FlowedLink {
        DatapathLink::new(
            NodePort::new(NodeId::new(1), PortId::new(1)),
            NodePort::new(NodeId::new(2), PortId::new(1)),
        )
        .flowed(Flow::new("udp"))
    }

    fn with_counters(tx: f64, rx: f64) -> FlowedLinkStats {
        let mut builder = SwitchCounterBuilder::new(ThresholdFactor::default());
        builder.apply(Update::Round(SwitchCounterRound {
            data_transmission_rate: Timed::now(Some(DataRate::from_bytes_per_second(tx))),
            data_reception_rate: Timed::now(Some(DataRate::from_bytes_per_second(rx))),
            packet_transmission_rate: Timed::now(Some(PacketRate::from_packets_per_second(tx))),
            packet_reception_rate: Timed::now(Some(PacketRate::from_packets_per_second(rx))),
            round_duration: Duration::from_secs(1),
        }));

        let now = SystemTime::now();
        FlowedLinkStats::new(
            flowed(),
            Arc::new(builder.build()),
            Arc::new(TrajectoryStats::absent(now)),
            GeneralLinkStats::absent(flowed().link()),
        )
    }

    #[test]
    fn falls_back_to_switch_counters() {
        let stats = with_counters(100.0, 50.0);

        assert_eq!(
            stats.throughput().get(),
            Some(DataRate::from_bytes_per_second(50.0))
        );
        assert!(!stats.throughput().is_safe());
        assert_eq!(stats.packet_loss().get(), Some(Ratio::new(0.5).unwrap()));
        assert!(!stats.latency().is_present());
        // no capacity known for the link
        assert!(!stats.available_bandwidth().is_present());
    }

    #[test]
    fn absent() {
        let stats = FlowedLinkStats::absent(flowed());

        assert_eq!(stats.total_updates(), 0);
        assert!(!stats.byte_loss().is_present());
        assert!(stats.has_same_core_stats(&stats));
        assert_eq!(stats.general().link(), stats.datapath_link());
    }

    #[test]
    fn total_updates() {
        assert_eq!(with_counters(1.0, 1.0).total_updates(), 1);
    }
}
