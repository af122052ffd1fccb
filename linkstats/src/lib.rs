/*!
# Link statistics

Per-link and per-flow statistics of a software-defined network, kept
up to date from measurement samples and reported to listeners when
they change significantly.

The [`LinkStatisticsManager`] follows the topology through
[`TopologyLinkEvent`]s: the statistics of a link exist while the link
does. Samples are turned into statistics by the calculations of
[`linkstats_core::calculator`] and averaged over the windows of the
[`StatsConfiguration`]. A statistic is only reported to the
[`LinkStatsListener`]s when it moves by more than the hysteresis
threshold.
*/

mod config;
mod listener;
mod manager;
mod topology;

// convenient re-export of `linkstats_core` core objects
pub use linkstats_core::{
    DatapathLink, Flow, FlowedLink, FlowedLinkStats, GeneralLinkStats, NodeId, NodePort, PortId,
    Stat, Timed, Trust,
};

pub use self::{
    config::{ConfigurationError, StatsConfiguration},
    listener::LinkStatsListener,
    manager::LinkStatisticsManager,
    topology::{TopologyEventKind, TopologyLinkEvent},
};
