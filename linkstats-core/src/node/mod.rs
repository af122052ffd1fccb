mod id;

pub use self::id::{NodeId, PortId};
use anyhow::anyhow;
use std::{fmt, str::FromStr};

/// A port on a given switch, one end of a [`DatapathLink`]
///
/// Rendered and parsed as `<node>[<port>]`.
///
/// ```
/// # use linkstats_core::node::{NodeId, NodePort, PortId};
/// let end = NodePort::new(NodeId::new(1), PortId::new(2));
/// assert_eq!(end.to_string(), "00:00:00:00:00:00:00:01[2]");
/// assert_eq!(end.to_string().parse::<NodePort>().unwrap(), end);
/// ```
///
/// [`DatapathLink`]: crate::link::DatapathLink
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePort {
    node: NodeId,
    port: PortId,
}

impl NodePort {
    pub const fn new(node: NodeId, port: PortId) -> Self {
        Self { node, port }
    }

    #[inline]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub const fn port(&self) -> PortId {
        self.port
    }
}

impl fmt::Display for NodePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.node, self.port)
    }
}

impl FromStr for NodePort {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (node, port) = s
            .trim()
            .strip_suffix(']')
            .and_then(|s| s.split_once('['))
            .ok_or_else(|| anyhow!("Expecting `<node>[<port>]', got {s:?}"))?;

        Ok(Self::new(node.parse()?, port.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_invalid() {
        assert!("1".parse::<NodePort>().is_err());
        assert!("1[2".parse::<NodePort>().is_err());
        assert!("[2]".parse::<NodePort>().is_err());
    }

    #[test]
    fn parse_decimal_node() {
        let end: NodePort = "7[1]".parse().unwrap();
        assert_eq!(end.node(), NodeId::new(7));
        assert_eq!(end.port(), PortId::new(1));
    }
}
