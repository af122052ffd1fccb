use crate::link::DatapathLink;
use anyhow::ensure;
use std::{fmt, str::FromStr, sync::Arc};

/// An opaque traffic descriptor scoping statistics within a link
///
/// The descriptor is never interpreted, only compared. Cloning a
/// [`Flow`] is cheap.
///
/// ```
/// # use linkstats_core::link::Flow;
/// let flow = Flow::new("eth_type=0x0800,ip_proto=6");
/// assert_eq!(flow, "eth_type=0x0800,ip_proto=6".parse().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Flow(Arc<str>);

impl Flow {
    pub fn new(descriptor: impl Into<Arc<str>>) -> Self {
        Self(descriptor.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Flow {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ensure!(!s.is_empty(), "Expecting a non empty flow descriptor");
        Ok(Self::new(s))
    }
}

/// A [`DatapathLink`] scoped to one [`Flow`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowedLink {
    link: DatapathLink,
    flow: Flow,
}

impl FlowedLink {
    pub fn new(link: DatapathLink, flow: Flow) -> Self {
        Self { link, flow }
    }

    #[inline]
    pub fn link(&self) -> DatapathLink {
        self.link
    }

    #[inline]
    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn into_parts(self) -> (DatapathLink, Flow) {
        (self.link, self.flow)
    }
}

impl fmt::Display for FlowedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{{}}}", self.link, self.flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_flow_rejected() {
        assert!("".parse::<Flow>().is_err());
        assert!("   ".parse::<Flow>().is_err());
    }

    #[test]
    fn identity() {
        let a = Flow::new("in_port=1");
        let b = Flow::new(String::from("in_port=1"));
        assert_eq!(a, b);
        assert_ne!(a, Flow::new("in_port=2"));
    }
}
