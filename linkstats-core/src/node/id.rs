use anyhow::{anyhow, ensure};
use std::{fmt, str};

/// The datapath identifier of a switch
///
/// Displayed the way OpenFlow controllers print datapath ids: eight
/// colon separated hexadecimal bytes.
///
/// ```
/// # use linkstats_core::node::NodeId;
/// let id = NodeId::new(42);
/// assert_eq!(id.to_string(), "00:00:00:00:00:00:00:2a");
/// assert_eq!("00:00:00:00:00:00:00:2a".parse::<NodeId>().unwrap(), id);
/// assert_eq!("42".parse::<NodeId>().unwrap(), id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct NodeId(u64);

impl NodeId {
    pub const ZERO: Self = NodeId::new(0);
    pub const ONE: Self = NodeId::new(1);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_u64(self) -> u64 {
        self.0
    }
}

impl str::FromStr for NodeId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.contains(':') {
            return s.parse().map(Self).map_err(|error| anyhow!("{error}"));
        }

        let mut id = 0u64;
        let mut bytes = 0;
        for byte in s.split(':') {
            ensure!(byte.len() == 2, "Expecting two hex digits per byte: {s:?}");
            let byte = u8::from_str_radix(byte, 16).map_err(|error| anyhow!("{error}"))?;
            id = (id << 8) | u64::from(byte);
            bytes += 1;
        }
        ensure!(bytes == 8, "Expecting 8 bytes in datapath id: {s:?}");

        Ok(Self(id))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.to_be_bytes();
        for (index, byte) in bytes.iter().enumerate() {
            if index != 0 {
                f.write_str(":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
impl fmt::LowerHex for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
impl fmt::UpperHex for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

/// The number of a port on a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct PortId(u32);

impl PortId {
    pub const fn new(port: u32) -> Self {
        Self(port)
    }

    #[inline]
    pub const fn into_u32(self) -> u32 {
        self.0
    }
}

impl str::FromStr for PortId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self).map_err(|error| anyhow!("{error}"))
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
