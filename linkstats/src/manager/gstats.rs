use crate::{StatsConfiguration, manager::fstats::FStats};
use linkstats_core::{
    DatapathLink, Flow, FlowedLinkStats, GeneralLinkStats, Timed,
    calculator,
    measure::{DataRate, PacketRate},
    sample::GeneralSample,
    stats::{
        CapacityError, LinkConfigBuilder, LldpProbingBuilder, SecureProbingBuilder, StatsCell,
        SwitchesBuilder,
    },
};
use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

/// The sub-statistics of a link, shared with its flows so that a frozen
/// [`FlowedLinkStats`] always embeds the general statistics of its link.
pub(crate) struct GeneralCells {
    link: DatapathLink,
    link_config: StatsCell<LinkConfigBuilder>,
    switches: StatsCell<SwitchesBuilder>,
    lldp_probing: StatsCell<LldpProbingBuilder>,
    secure_probing: StatsCell<SecureProbingBuilder>,
}

impl GeneralCells {
    fn new(link: DatapathLink, config: &StatsConfiguration) -> Self {
        Self {
            link,
            link_config: StatsCell::new(LinkConfigBuilder::new()),
            switches: StatsCell::new(SwitchesBuilder::new(
                config.packet_drop_rate_window,
                config.hysteresis,
            )),
            lldp_probing: StatsCell::new(LldpProbingBuilder::new(
                config.lldp_latency_window,
                config.hysteresis,
            )),
            secure_probing: StatsCell::new(SecureProbingBuilder::new(
                config.secure_probing_latency_window,
                config.secure_probing_loss_window,
                config.hysteresis,
            )),
        }
    }

    pub(crate) fn freeze(&self) -> GeneralLinkStats {
        GeneralLinkStats::new(
            self.link,
            self.link_config.freeze(),
            self.switches.freeze(),
            self.lldp_probing.freeze(),
            self.secure_probing.freeze(),
        )
    }
}

/// Mutable statistics of a link and of its flows
pub(crate) struct GStats {
    cells: Arc<GeneralCells>,
    config: StatsConfiguration,
    flows: HashMap<Flow, FStats>,
    /// keys of `flows`, in creation order
    order: Vec<Flow>,
}

impl GStats {
    pub(crate) fn new(link: DatapathLink, config: StatsConfiguration) -> Self {
        Self {
            cells: Arc::new(GeneralCells::new(link, &config)),
            config,
            flows: HashMap::new(),
            order: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn link(&self) -> DatapathLink {
        self.cells.link
    }

    pub(crate) fn freeze(&self) -> GeneralLinkStats {
        self.cells.freeze()
    }

    pub(crate) fn update_physical_capacity(&self, capacity: Timed<Option<DataRate>>) -> bool {
        self.cells
            .link_config
            .update(|builder| builder.set_physical_capacity(capacity))
    }

    pub(crate) fn update_virtual_capacity(
        &self,
        capacity: Timed<Option<DataRate>>,
    ) -> Result<bool, CapacityError> {
        self.cells
            .link_config
            .try_update(|builder| builder.set_virtual_capacity(capacity))
    }

    pub(crate) fn update_source_packet_drop_rate(&self, rate: Timed<PacketRate>) -> bool {
        self.cells
            .switches
            .update(|builder| builder.set_source_packet_drop_rate(rate))
    }

    pub(crate) fn update_destination_packet_drop_rate(&self, rate: Timed<PacketRate>) -> bool {
        self.cells
            .switches
            .update(|builder| builder.set_destination_packet_drop_rate(rate))
    }

    pub(crate) fn update(&self, sample: &GeneralSample) -> bool {
        debug_assert_eq!(sample.link(), self.link());

        match sample {
            GeneralSample::Lldp(sample) => {
                let update = calculator::lldp_probing(sample);
                self.cells
                    .lldp_probing
                    .update(|builder| builder.apply(update))
            }
            GeneralSample::Secure(sample) => {
                let update = calculator::secure_probing(sample);
                self.cells
                    .secure_probing
                    .update(|builder| builder.apply(update))
            }
        }
    }

    pub(crate) fn flowed(&self, flow: &Flow) -> Option<&FStats> {
        self.flows.get(flow)
    }

    /// the statistics of the given flow, created if needed
    pub(crate) fn compute_flowed(&mut self, flow: &Flow) -> &FStats {
        match self.flows.entry(flow.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let link = self.cells.link.flowed(flow.clone());
                self.order.push(flow.clone());
                entry.insert(FStats::new(link, Arc::clone(&self.cells), &self.config))
            }
        }
    }

    pub(crate) fn remove_flowed(&mut self, flow: &Flow) -> Option<FStats> {
        let removed = self.flows.remove(flow)?;
        self.order.retain(|known| known != flow);
        Some(removed)
    }

    /// frozen statistics of every flow, in creation order
    pub(crate) fn all_frozen_flowed(&self) -> Vec<FlowedLinkStats> {
        self.order
            .iter()
            .filter_map(|flow| self.flows.get(flow))
            .map(FStats::freeze)
            .collect()
    }

    /// drop every flow, returning their last statistics
    pub(crate) fn clear(&mut self) -> Vec<FlowedLinkStats> {
        let last = self.all_frozen_flowed();
        self.flows.clear();
        self.order.clear();
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkstats_core::{
        NodeId, NodePort, PortId,
        measure::Latency,
        sample::{LldpProbingSample, SecureProbingSample},
    };
    use std::time::{Duration, SystemTime};

    fn link() -> DatapathLink {
        DatapathLink::new(
            NodePort::new(NodeId::new(1), PortId::new(1)),
            NodePort::new(NodeId::new(2), PortId::new(2)),
        )
    }

    fn gstats() -> GStats {
        GStats::new(link(), StatsConfiguration::default())
    }

    fn mbps(value: f64) -> Timed<Option<DataRate>> {
        Timed::now(Some(DataRate::from_bits_per_second(value * 1_000_000.0)))
    }

    #[test]
    fn flows_keep_creation_order() {
        let mut gstats = gstats();
        for flow in ["c", "a", "b"] {
            gstats.compute_flowed(&Flow::new(flow));
        }
        // already known, does not move
        gstats.compute_flowed(&Flow::new("c"));

        let flows: Vec<_> = gstats
            .all_frozen_flowed()
            .iter()
            .map(|stats| stats.flow().to_string())
            .collect();
        assert_eq!(flows, ["c", "a", "b"]);

        assert!(gstats.remove_flowed(&Flow::new("a")).is_some());
        assert!(gstats.remove_flowed(&Flow::new("a")).is_none());
        assert_eq!(gstats.all_frozen_flowed().len(), 2);
    }

    #[test]
    fn clear_returns_last_flowed_stats() {
        let mut gstats = gstats();
        gstats.compute_flowed(&Flow::new("a"));
        gstats.compute_flowed(&Flow::new("b"));

        let last = gstats.clear();

        assert_eq!(last.len(), 2);
        assert!(gstats.all_frozen_flowed().is_empty());
        assert!(gstats.clear().is_empty());
    }

    #[test]
    fn flowed_stats_embed_general_stats() {
        let mut gstats = gstats();
        gstats.compute_flowed(&Flow::new("a"));

        assert!(gstats.update_physical_capacity(mbps(100.0)));

        let flowed = gstats.flowed(&Flow::new("a")).unwrap().freeze();
        assert_eq!(flowed.general(), &gstats.freeze());
        assert!(flowed.data_capacity().is_present());
    }

    #[test]
    fn virtual_capacity_requires_physical_capacity() {
        let gstats = gstats();

        assert!(matches!(
            gstats.update_virtual_capacity(mbps(10.0)),
            Err(CapacityError::NoPhysicalCapacity)
        ));

        gstats.update_physical_capacity(mbps(100.0));
        assert!(matches!(
            gstats.update_virtual_capacity(mbps(200.0)),
            Err(CapacityError::ExceedsPhysical { .. })
        ));
        assert!(gstats.update_virtual_capacity(mbps(10.0)).unwrap());
        // same value, no change
        assert!(!gstats.update_virtual_capacity(mbps(10.0)).unwrap());
    }

    #[test]
    fn samples_reach_their_sub_stats() {
        let gstats = gstats();
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let latency = Timed::new(Latency::new(Duration::from_millis(4)), at);

        assert!(gstats.update(&LldpProbingSample::new(link(), latency).into()));
        assert!(gstats.freeze().lldp_probing().latency().is_present());
        assert!(!gstats.freeze().secure_probing().latency().is_present());

        // nothing measured, nothing to report
        assert!(!gstats.update(&SecureProbingSample::no_results(link()).into()));
    }
}
