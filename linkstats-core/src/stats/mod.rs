//! Sub-statistics builders, their frozen snapshots and the per-link and
//! per-flow aggregates made of them.
//!
//! Every builder lives inside a [`StatsCell`]: the builder is mutated
//! under a lock and each mutation publishes a new immutable snapshot.
//! Readers only ever see complete snapshots.

mod cell;
mod flowed;
mod general;
mod link_config;
mod lldp;
mod secure;
mod switch_counter;
mod switches;
mod trajectory;

pub use self::{
    cell::StatsCell,
    flowed::FlowedLinkStats,
    general::GeneralLinkStats,
    link_config::{CapacityError, LinkConfigBuilder, LinkConfigStats},
    lldp::{LldpProbingBuilder, LldpProbingStats},
    secure::{SecureProbingBuilder, SecureProbingStats},
    switch_counter::{SwitchCounterBuilder, SwitchCounterStats},
    switches::{SwitchesBuilder, SwitchesStats},
    trajectory::{TrajectoryBuilder, TrajectoryStats},
};

/// Comparison of the values that matter to consumers of a snapshot
///
/// Two snapshots have the same core stats when every statistic has the
/// same presence and the same reported value. Timestamps, update
/// counters and secondary values (latest value, standard deviation,
/// round durations) are not part of the core.
pub trait CoreStats {
    fn has_same_core_stats(&self, other: &Self) -> bool;
}

/// A mutable accumulator producing immutable snapshots
pub trait StatsBuilder {
    type Stats: CoreStats;

    fn build(&self) -> Self::Stats;
}
