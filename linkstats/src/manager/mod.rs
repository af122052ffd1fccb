mod fstats;
mod gstats;

use self::{fstats::FStats, gstats::GStats};
use crate::{LinkStatsListener, StatsConfiguration, TopologyEventKind, TopologyLinkEvent};
use linkstats_core::{
    DatapathLink, Flow, FlowedLink, FlowedLinkStats, GeneralLinkStats, NodeId, Timed,
    measure::{DataRate, PacketRate},
    sample::{FlowedSample, GeneralSample},
    stats::CapacityError,
};
use log::{debug, error, info, trace, warn};
use std::{
    collections::{HashMap, hash_map::Entry},
    ptr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Statistics of every link of the network, and of their flows
///
/// The statistics of a link exist from the moment the topology reports
/// the link until it reports its removal. Statistics of a flow are
/// created by the first sample about that flow.
///
/// Every operation holds the manager lock for its whole duration, so
/// updates of the same link are serialized and listeners receive the
/// snapshot that was used to detect the change. Listeners are called
/// while the lock is held.
///
/// ```
/// # use linkstats::{LinkStatisticsManager, StatsConfiguration, TopologyLinkEvent};
/// # use linkstats_core::{DatapathLink, NodeId, NodePort, PortId, Timed};
/// # use linkstats_core::measure::DataRate;
/// let manager = LinkStatisticsManager::new(StatsConfiguration::default());
/// let link = DatapathLink::new(
///     NodePort::new(NodeId::new(1), PortId::new(1)),
///     NodePort::new(NodeId::new(2), PortId::new(1)),
/// );
///
/// let speed = DataRate::from_bits_per_second(1e9);
/// manager.on_link_event(&TopologyLinkEvent::added(link, Some(speed)));
///
/// let half = Timed::now(Some(DataRate::from_bits_per_second(5e8)));
/// assert!(manager.update_virtual_capacity(link, half).unwrap());
///
/// let stats = manager.general_stats(link).unwrap();
/// assert_eq!(stats.data_capacity().get(), half.into_value());
///
/// manager.on_link_event(&TopologyLinkEvent::removed(link));
/// assert!(manager.general_stats(link).is_none());
/// ```
pub struct LinkStatisticsManager {
    config: StatsConfiguration,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    links: HashMap<DatapathLink, GStats>,
    /// last accepted virtual capacity of each link, re-applied when a
    /// link (re)appears
    cached_virtual_capacities: HashMap<DatapathLink, Timed<Option<DataRate>>>,
    listeners: Listeners,
}

#[derive(Default)]
struct Listeners(Vec<Arc<dyn LinkStatsListener>>);

impl LinkStatisticsManager {
    pub fn new(config: StatsConfiguration) -> Self {
        info!(
            "Using an LLDP-probing latency window size of {}",
            config.lldp_latency_window
        );
        info!(
            "Using a secure-probing latency window size of {}",
            config.secure_probing_latency_window
        );
        info!(
            "Using a secure-probing loss window size of {}",
            config.secure_probing_loss_window
        );
        info!(
            "Using a trajectory latency window size of {}",
            config.trajectory_latency_window
        );
        info!(
            "Using a trajectory loss window size of {}",
            config.trajectory_loss_window
        );
        info!(
            "Using a packet drop rate window size of {}",
            config.packet_drop_rate_window
        );
        info!("Using a hysteresis threshold of {}", config.hysteresis);

        Self {
            config,
            state: Mutex::new(State::default()),
        }
    }

    #[inline]
    pub fn config(&self) -> &StatsConfiguration {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a change of the network topology
    pub fn on_link_event(&self, event: &TopologyLinkEvent) {
        let mut state = self.lock();
        let link = event.link();
        trace!("Received topology event ({}) for link {link}", event.kind());

        match event.kind() {
            TopologyEventKind::LinkAdded => {
                state.link_added(link, event.source_port_speed(), self.config)
            }
            TopologyEventKind::LinkUpdated => state.link_updated(link, event.source_port_speed()),
            TopologyEventKind::LinkRemoved => state.link_removed(link),
        }
    }

    pub fn general_stats(&self, link: DatapathLink) -> Option<GeneralLinkStats> {
        self.lock().links.get(&link).map(GStats::freeze)
    }

    pub fn all_general_stats(&self) -> Vec<GeneralLinkStats> {
        self.lock().links.values().map(GStats::freeze).collect()
    }

    /// Set (or remove, with an absent capacity) the virtual capacity
    /// of a link
    ///
    /// The capacity of a link that is not known yet is remembered and
    /// applied when the link appears; `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// See [`CapacityError`]. A rejected capacity leaves the statistics
    /// untouched.
    pub fn update_virtual_capacity(
        &self,
        link: DatapathLink,
        capacity: Timed<Option<DataRate>>,
    ) -> Result<bool, CapacityError> {
        let mut guard = self.lock();
        let State {
            links,
            cached_virtual_capacities,
            listeners,
        } = &mut *guard;

        let Some(gstats) = links.get(&link) else {
            debug!("Caching virtual capacity of unknown link {link}");
            cached_virtual_capacities.insert(link, capacity);
            return Ok(false);
        };

        let updated = gstats.update_virtual_capacity(capacity)?;
        cached_virtual_capacities.insert(link, capacity);
        if updated {
            listeners.general_updated(gstats, "virtual-capacity");
        }
        Ok(updated)
    }

    /// Update the packet drop rate of a switch
    ///
    /// The rate applies to the source side of the links leaving the
    /// switch and to the destination side of the links entering it.
    pub fn update_packet_drop_rate(&self, node: NodeId, rate: Timed<PacketRate>) -> bool {
        let state = self.lock();
        let mut any_updated = false;

        for gstats in state.links.values() {
            let link = gstats.link();
            let source = link.has_source_node(node) && gstats.update_source_packet_drop_rate(rate);
            let destination =
                link.has_destination_node(node) && gstats.update_destination_packet_drop_rate(rate);

            let update_type = match (source, destination) {
                (true, true) => "src/dest-packet-drop-rate",
                (true, false) => "src-packet-drop-rate",
                (false, true) => "dest-packet-drop-rate",
                (false, false) => continue,
            };
            any_updated = true;
            state.listeners.general_updated(gstats, update_type);
        }

        any_updated
    }

    /// Feed an LLDP or secure probing sample to the statistics of its
    /// link; samples of unknown links are ignored
    pub fn update_general_stats(&self, sample: impl Into<GeneralSample>) -> bool {
        let sample = sample.into();
        let state = self.lock();

        let Some(gstats) = state.links.get(&sample.link()) else {
            trace!("Ignoring sample of unknown link {}", sample.link());
            return false;
        };

        let updated = gstats.update(&sample);
        if updated {
            let update_type = match sample {
                GeneralSample::Lldp(_) => "LLDP-probing",
                GeneralSample::Secure(_) => "secure-probing",
            };
            state.listeners.general_updated(gstats, update_type);
        }
        updated
    }

    pub fn flowed_stats(&self, link: &FlowedLink) -> Option<FlowedLinkStats> {
        self.lock()
            .links
            .get(&link.link())
            .and_then(|gstats| gstats.flowed(link.flow()))
            .map(FStats::freeze)
    }

    pub fn all_flowed_stats(&self) -> Vec<FlowedLinkStats> {
        self.lock()
            .links
            .values()
            .flat_map(GStats::all_frozen_flowed)
            .collect()
    }

    pub fn flowed_stats_of_link(&self, link: DatapathLink) -> Vec<FlowedLinkStats> {
        self.lock()
            .links
            .get(&link)
            .map(GStats::all_frozen_flowed)
            .unwrap_or_default()
    }

    pub fn flowed_stats_of_flow(&self, flow: &Flow) -> Vec<FlowedLinkStats> {
        self.lock()
            .links
            .values()
            .filter_map(|gstats| gstats.flowed(flow))
            .map(FStats::freeze)
            .collect()
    }

    /// Feed a switch counter or trajectory sample to the statistics of
    /// its flow, creating them on the first sample
    ///
    /// Samples of unknown links are ignored.
    pub fn update_flowed_stats(&self, sample: impl Into<FlowedSample>) -> bool {
        let sample = sample.into();
        let mut guard = self.lock();
        let State {
            links, listeners, ..
        } = &mut *guard;

        let link = sample.link();
        let Some(gstats) = links.get_mut(&link.link()) else {
            trace!("Ignoring sample of unknown flowed-link {link}");
            return false;
        };

        let fstats = gstats.compute_flowed(link.flow());
        let updated = fstats.update(&sample);
        if updated {
            let update_type = match sample {
                FlowedSample::SwitchCounter(_) => "switch-counter",
                FlowedSample::Trajectory(_) => "trajectory",
            };
            listeners.flowed_updated(fstats, update_type);
        }
        updated
    }

    pub fn clear_flowed_stats(&self, link: &FlowedLink) -> bool {
        let mut guard = self.lock();
        let State {
            links, listeners, ..
        } = &mut *guard;

        let Some(fstats) = links
            .get_mut(&link.link())
            .and_then(|gstats| gstats.remove_flowed(link.flow()))
        else {
            return false;
        };

        listeners.flowed_cleared(&fstats.freeze());
        true
    }

    pub fn clear_all_flowed_stats(&self) -> bool {
        let mut guard = self.lock();
        let State {
            links, listeners, ..
        } = &mut *guard;

        let mut any_cleared = false;
        for gstats in links.values_mut() {
            let last = gstats.clear();
            if !last.is_empty() {
                any_cleared = true;
                listeners.flowed_cleared_batch(&last);
            }
        }
        any_cleared
    }

    pub fn clear_flowed_stats_of_link(&self, link: DatapathLink) -> bool {
        let mut guard = self.lock();
        let State {
            links, listeners, ..
        } = &mut *guard;

        let Some(gstats) = links.get_mut(&link) else {
            return false;
        };
        let last = gstats.clear();
        if last.is_empty() {
            return false;
        }

        listeners.flowed_cleared_batch(&last);
        true
    }

    pub fn clear_flowed_stats_of_flow(&self, flow: &Flow) -> bool {
        let mut guard = self.lock();
        let State {
            links, listeners, ..
        } = &mut *guard;

        let mut any_cleared = false;
        for gstats in links.values_mut() {
            if let Some(fstats) = gstats.remove_flowed(flow) {
                any_cleared = true;
                listeners.flowed_cleared(&fstats.freeze());
            }
        }
        any_cleared
    }

    /// Registering the same listener twice has no effect
    pub fn add_listener(&self, listener: Arc<dyn LinkStatsListener>) {
        if self.lock().listeners.add(listener) {
            trace!("Added link statistics listener");
        } else {
            warn!("Trying to add an already registered listener");
        }
    }

    pub fn remove_listener<L>(&self, listener: &Arc<L>)
    where
        L: LinkStatsListener + ?Sized,
    {
        if self.lock().listeners.remove(listener) {
            trace!("Removed link statistics listener");
        } else {
            warn!("Trying to remove an unregistered listener");
        }
    }
}

impl Default for LinkStatisticsManager {
    fn default() -> Self {
        Self::new(StatsConfiguration::default())
    }
}

impl State {
    fn link_added(
        &mut self,
        link: DatapathLink,
        speed: Option<DataRate>,
        config: StatsConfiguration,
    ) {
        debug_assert!(
            !self.links.contains_key(&link),
            "link {link} added while already known"
        );
        let Entry::Vacant(entry) = self.links.entry(link) else {
            error!("Ignoring addition of already known link {link}");
            return;
        };

        let gstats = entry.insert(GStats::new(link, config));
        debug!("Created general stats for link {link}");

        // a new link is always reported, even without a known port speed
        gstats.update_physical_capacity(Timed::now(speed));
        self.listeners.general_updated(gstats, "physical-capacity");

        if let Some(&capacity) = self.cached_virtual_capacities.get(&link) {
            debug!("Re-applying cached virtual capacity of link {link}");
            match gstats.update_virtual_capacity(capacity) {
                Ok(true) => self.listeners.general_updated(gstats, "virtual-capacity"),
                Ok(false) => (),
                Err(error) => warn!("Cached virtual capacity of link {link} rejected: {error}"),
            }
        }
    }

    fn link_updated(&mut self, link: DatapathLink, speed: Option<DataRate>) {
        debug_assert!(
            self.links.contains_key(&link),
            "link {link} updated before being added"
        );
        let Some(gstats) = self.links.get(&link) else {
            error!("Ignoring update of unknown link {link}");
            return;
        };

        if gstats.update_physical_capacity(Timed::now(speed)) {
            self.listeners.general_updated(gstats, "physical-capacity");
        }
    }

    fn link_removed(&mut self, link: DatapathLink) {
        debug_assert!(
            self.links.contains_key(&link),
            "link {link} removed before being added"
        );
        let Some(mut gstats) = self.links.remove(&link) else {
            error!("Ignoring removal of unknown link {link}");
            return;
        };
        debug!("Removed general stats for link {link}");

        self.listeners.general_removed(&mut gstats);
    }
}

impl Listeners {
    fn add(&mut self, listener: Arc<dyn LinkStatsListener>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.0.push(listener);
        true
    }

    fn remove<L>(&mut self, listener: &Arc<L>) -> bool
    where
        L: LinkStatsListener + ?Sized,
    {
        let before = self.0.len();
        self.0
            .retain(|known| !ptr::addr_eq(Arc::as_ptr(known), Arc::as_ptr(listener)));
        self.0.len() != before
    }

    fn contains<L>(&self, listener: &Arc<L>) -> bool
    where
        L: LinkStatsListener + ?Sized,
    {
        self.0
            .iter()
            .any(|known| ptr::addr_eq(Arc::as_ptr(known), Arc::as_ptr(listener)))
    }

    /// notify the new general stats of a link, then the refreshed
    /// flowed stats of its flows
    fn general_updated(&self, gstats: &GStats, update_type: &str) {
        trace!(
            "General stats ({update_type}) updated for link {}",
            gstats.link()
        );

        let general = gstats.freeze();
        let flowed = gstats.all_frozen_flowed();
        if !flowed.is_empty() {
            trace!(
                "Flowed stats ({update_type}) updated for {} flows of link {}",
                flowed.len(),
                gstats.link()
            );
        }

        for listener in &self.0 {
            listener.general_updated(&general);
            if !flowed.is_empty() {
                listener.flowed_updated_batch(&flowed);
            }
        }
    }

    fn flowed_updated(&self, fstats: &FStats, update_type: &str) {
        trace!(
            "Flowed stats ({update_type}) updated for flowed-link {}",
            fstats.link()
        );

        let flowed = fstats.freeze();
        for listener in &self.0 {
            listener.flowed_updated(&flowed);
        }
    }

    fn general_removed(&self, gstats: &mut GStats) {
        let general = gstats.freeze();
        let flowed = gstats.clear();
        if !flowed.is_empty() {
            trace!(
                "Flowed stats cleared for {} flows of link {}",
                flowed.len(),
                gstats.link()
            );
        }

        for listener in &self.0 {
            listener.general_cleared(&general);
            if !flowed.is_empty() {
                listener.flowed_cleared_batch(&flowed);
            }
        }
    }

    fn flowed_cleared(&self, last: &FlowedLinkStats) {
        trace!("Flowed stats cleared for flowed-link {}", last.link());

        for listener in &self.0 {
            listener.flowed_cleared(last);
        }
    }

    fn flowed_cleared_batch(&self, last: &[FlowedLinkStats]) {
        trace!("Flowed stats cleared for {} flowed-links", last.len());

        for listener in &self.0 {
            listener.flowed_cleared_batch(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkstats_core::{NodePort, PortId};
    use std::time::SystemTime;

    #[derive(Default)]
    struct Counting {
        general: Mutex<Vec<DatapathLink>>,
    }

    impl LinkStatsListener for Counting {
        fn general_updated(&self, stats: &GeneralLinkStats) {
            self.general.lock().unwrap().push(stats.link());
        }

        fn flowed_updated(&self, _: &FlowedLinkStats) {}

        fn general_cleared(&self, _: &GeneralLinkStats) {}

        fn flowed_cleared(&self, _: &FlowedLinkStats) {}
    }

    fn node_port(node: u64, port: u32) -> NodePort {
        NodePort::new(NodeId::new(node), PortId::new(port))
    }

    fn add(manager: &LinkStatisticsManager, link: DatapathLink) {
        manager.on_link_event(&TopologyLinkEvent::added(link, None));
    }

    #[test]
    fn listener_registration_is_idempotent() {
        let manager = LinkStatisticsManager::default();
        let listener = Arc::new(Counting::default());

        manager.add_listener(listener.clone());
        manager.add_listener(listener.clone());
        assert_eq!(manager.lock().listeners.0.len(), 1);

        manager.remove_listener(&listener);
        manager.remove_listener(&listener);
        assert!(manager.lock().listeners.0.is_empty());
    }

    #[test]
    fn link_without_port_speed_is_reported() {
        let manager = LinkStatisticsManager::default();
        let listener = Arc::new(Counting::default());
        manager.add_listener(listener.clone());

        let link = DatapathLink::new(node_port(1, 1), node_port(2, 1));
        add(&manager, link);

        assert_eq!(*listener.general.lock().unwrap(), [link]);
        let stats = manager.general_stats(link).unwrap();
        assert!(!stats.link_config().physical_capacity().is_present());
    }

    #[test]
    fn drop_rate_applies_to_both_sides_of_a_switch() {
        let manager = LinkStatisticsManager::default();
        let outgoing = DatapathLink::new(node_port(1, 1), node_port(2, 1));
        let incoming = outgoing.reversed();
        let unrelated = DatapathLink::new(node_port(3, 1), node_port(4, 1));
        for link in [outgoing, incoming, unrelated] {
            add(&manager, link);
        }

        let listener = Arc::new(Counting::default());
        manager.add_listener(listener.clone());

        let rate = Timed::new(PacketRate::from_packets_per_second(12.0), SystemTime::now());
        assert!(manager.update_packet_drop_rate(NodeId::new(1), rate));

        let outgoing_stats = manager.general_stats(outgoing).unwrap();
        assert!(outgoing_stats.source_packet_drop_rate().is_present());
        assert!(!outgoing_stats.destination_packet_drop_rate().is_present());

        let incoming_stats = manager.general_stats(incoming).unwrap();
        assert!(!incoming_stats.source_packet_drop_rate().is_present());
        assert!(incoming_stats.destination_packet_drop_rate().is_present());

        let unrelated_stats = manager.general_stats(unrelated).unwrap();
        assert!(!unrelated_stats.source_packet_drop_rate().is_present());

        let mut notified = listener.general.lock().unwrap().clone();
        notified.sort();
        let mut expected = vec![outgoing, incoming];
        expected.sort();
        assert_eq!(notified, expected);

        // same rate again, within the hysteresis
        assert!(!manager.update_packet_drop_rate(NodeId::new(1), rate));
        // no link for this switch
        assert!(!manager.update_packet_drop_rate(NodeId::new(9), rate));
    }

    #[test]
    fn virtual_capacity_of_unknown_link_is_cached() {
        let manager = LinkStatisticsManager::default();
        let link = DatapathLink::new(node_port(1, 1), node_port(2, 1));
        let capacity = Timed::now(Some(DataRate::from_bits_per_second(1e6)));

        assert!(!manager.update_virtual_capacity(link, capacity).unwrap());

        manager.on_link_event(&TopologyLinkEvent::added(
            link,
            Some(DataRate::from_bits_per_second(1e9)),
        ));
        let stats = manager.general_stats(link).unwrap();
        let expected = Some(DataRate::from_bits_per_second(1e6));
        assert_eq!(stats.link_config().virtual_capacity().get(), expected);
        assert_eq!(stats.data_capacity().get(), expected);
    }

    #[test]
    fn cached_virtual_capacity_above_physical_is_dropped() {
        let manager = LinkStatisticsManager::default();
        let link = DatapathLink::new(node_port(1, 1), node_port(2, 1));
        let capacity = Timed::now(Some(DataRate::from_bits_per_second(1e9)));

        assert!(!manager.update_virtual_capacity(link, capacity).unwrap());

        manager.on_link_event(&TopologyLinkEvent::added(
            link,
            Some(DataRate::from_bits_per_second(1e6)),
        ));
        let stats = manager.general_stats(link).unwrap();
        assert!(!stats.link_config().virtual_capacity().is_present());
        assert_eq!(
            stats.data_capacity().get(),
            Some(DataRate::from_bits_per_second(1e6))
        );
    }
}
