use linkstats_core::{DatapathLink, measure::DataRate};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyEventKind {
    LinkAdded,
    LinkUpdated,
    LinkRemoved,
}

/// A change of a link in the network topology
///
/// Added and updated links carry the current speed of their source
/// port when the source switch is known; it becomes the physical
/// capacity of the link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyLinkEvent {
    kind: TopologyEventKind,
    link: DatapathLink,
    source_port_speed: Option<DataRate>,
}

impl TopologyLinkEvent {
    pub fn added(link: DatapathLink, source_port_speed: Option<DataRate>) -> Self {
        Self {
            kind: TopologyEventKind::LinkAdded,
            link,
            source_port_speed,
        }
    }

    pub fn updated(link: DatapathLink, source_port_speed: Option<DataRate>) -> Self {
        Self {
            kind: TopologyEventKind::LinkUpdated,
            link,
            source_port_speed,
        }
    }

    pub fn removed(link: DatapathLink) -> Self {
        Self {
            kind: TopologyEventKind::LinkRemoved,
            link,
            source_port_speed: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> TopologyEventKind {
        self.kind
    }

    #[inline]
    pub fn link(&self) -> DatapathLink {
        self.link
    }

    #[inline]
    pub fn source_port_speed(&self) -> Option<DataRate> {
        self.source_port_speed
    }
}

impl fmt::Display for TopologyEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkAdded => f.write_str("link added"),
            Self::LinkUpdated => f.write_str("link updated"),
            Self::LinkRemoved => f.write_str("link removed"),
        }
    }
}
