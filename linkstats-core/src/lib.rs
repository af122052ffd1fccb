//! Primitives of the link statistics engine: identifiers, units, samples,
//! the statistics calculations and the sub-statistics snapshots.
//!
//! The engine itself, which owns the statistics of every link and
//! notifies listeners, is in the `linkstats` crate.

pub mod calculator;
pub mod defaults;
pub mod link;
pub mod measure;
pub mod node;
pub mod sample;
pub mod stat;
pub mod stats;
pub mod summary;
mod time;

pub use self::{
    link::{DatapathLink, Flow, FlowedLink},
    node::{NodeId, NodePort, PortId},
    stat::{Stat, Timed, Trust},
    stats::{FlowedLinkStats, GeneralLinkStats},
};
