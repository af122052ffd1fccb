use crate::{
    link::{Flow, FlowedLink},
    node::{NodeId, NodePort},
};
use anyhow::anyhow;
use std::{fmt, str::FromStr};

/// Unique identifier of a physical link between two switch ports
///
/// The link is directed: `(a, b)` and `(b, a)` are two different
/// links, each one having its own statistics.
///
/// ```
/// # use linkstats_core::{link::DatapathLink, node::{NodeId, NodePort, PortId}};
/// let a = NodePort::new(NodeId::new(1), PortId::new(1));
/// let b = NodePort::new(NodeId::new(2), PortId::new(3));
///
/// let link = DatapathLink::new(a, b);
/// assert_ne!(link, link.reversed());
/// assert_eq!(link.reversed().reversed(), link);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatapathLink {
    src: NodePort,
    dst: NodePort,
}

impl DatapathLink {
    pub const fn new(src: NodePort, dst: NodePort) -> Self {
        Self { src, dst }
    }

    #[inline]
    pub const fn source(&self) -> NodePort {
        self.src
    }

    #[inline]
    pub const fn destination(&self) -> NodePort {
        self.dst
    }

    #[inline]
    pub fn has_source_node(&self, node: NodeId) -> bool {
        self.src.node() == node
    }

    #[inline]
    pub fn has_destination_node(&self, node: NodeId) -> bool {
        self.dst.node() == node
    }

    /// the same link in the opposite direction
    #[must_use = "function does not modify the current value"]
    pub const fn reversed(self) -> Self {
        Self::new(self.dst, self.src)
    }

    /// scope this link to the given [`Flow`]
    pub fn flowed(self, flow: Flow) -> FlowedLink {
        FlowedLink::new(self, flow)
    }
}

impl fmt::Display for DatapathLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {}", self.src, self.dst)
    }
}

impl FromStr for DatapathLink {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (src, dst) = s
            .split_once('>')
            .ok_or_else(|| anyhow!("Expecting `<source> > <destination>', got {s:?}"))?;

        Ok(Self::new(src.parse()?, dst.parse()?))
    }
}
