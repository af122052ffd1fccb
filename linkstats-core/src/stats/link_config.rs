use crate::{
    measure::DataRate,
    stat::{Stat, Timed, Trust},
    stats::{CoreStats, StatsBuilder},
};
use log::warn;
use std::time::SystemTime;

/// Rejection of a virtual capacity
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CapacityError {
    #[error("virtual capacity can only be set when a physical capacity is present")]
    NoPhysicalCapacity,
    #[error("virtual capacity cannot be 0bps, use an absent capacity to remove the limit")]
    ZeroVirtualCapacity,
    #[error(
        "virtual capacity ({virtual_capacity}) must not exceed the physical capacity ({physical_capacity})"
    )]
    ExceedsPhysical {
        virtual_capacity: DataRate,
        physical_capacity: DataRate,
    },
}

/// Configured capacities of a link
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfigStats {
    physical_capacity: Stat<DataRate>,
    virtual_capacity: Stat<DataRate>,
    updates: u64,
}

impl LinkConfigStats {
    pub fn absent(timestamp: SystemTime) -> Self {
        Self {
            physical_capacity: Stat::absent(timestamp),
            virtual_capacity: Stat::absent(timestamp),
            updates: 0,
        }
    }

    /// speed of the source port of the link
    pub fn physical_capacity(&self) -> Stat<DataRate> {
        self.physical_capacity
    }

    /// administrative limit of the link, never above the physical capacity
    pub fn virtual_capacity(&self) -> Stat<DataRate> {
        self.virtual_capacity
    }

    /// the virtual capacity if any, otherwise the physical one
    pub fn data_capacity(&self) -> Stat<DataRate> {
        self.virtual_capacity.or(self.physical_capacity)
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl CoreStats for LinkConfigStats {
    fn has_same_core_stats(&self, other: &Self) -> bool {
        self.physical_capacity.has_same_core(&other.physical_capacity)
            && self.virtual_capacity.has_same_core(&other.virtual_capacity)
    }
}

#[derive(Debug, Clone)]
pub struct LinkConfigBuilder {
    physical_capacity: Timed<Option<DataRate>>,
    virtual_capacity: Timed<Option<DataRate>>,
    updates: u64,
}

impl LinkConfigBuilder {
    pub fn new() -> Self {
        let now = SystemTime::now();
        Self {
            physical_capacity: Timed::new(None, now),
            virtual_capacity: Timed::new(None, now),
            updates: 0,
        }
    }

    /// set the physical capacity
    ///
    /// A virtual capacity that no longer fits below the new physical
    /// capacity is dropped.
    pub fn set_physical_capacity(&mut self, capacity: Timed<Option<DataRate>>) {
        if let Some(virtual_capacity) = *self.virtual_capacity.value()
            && let Err(error) = check_virtual_capacity(*capacity.value(), virtual_capacity)
        {
            warn!("Dropping virtual capacity after physical capacity update: {error}");
            self.virtual_capacity = Timed::new(None, capacity.timestamp());
        }

        self.physical_capacity = capacity;
        self.updates = self.updates.saturating_add(1);
    }

    /// set the virtual capacity, an absent capacity removes the limit
    ///
    /// # Errors
    ///
    /// The capacity is rejected, and the builder left untouched, if no
    /// physical capacity is known, or if the virtual capacity is zero or
    /// above the physical capacity.
    pub fn set_virtual_capacity(
        &mut self,
        capacity: Timed<Option<DataRate>>,
    ) -> Result<(), CapacityError> {
        let physical_capacity = *self.physical_capacity.value();
        let Some(physical) = physical_capacity else {
            return Err(CapacityError::NoPhysicalCapacity);
        };
        if let Some(virtual_capacity) = *capacity.value() {
            check_virtual_capacity(Some(physical), virtual_capacity)?;
        }

        self.virtual_capacity = capacity;
        self.updates = self.updates.saturating_add(1);
        Ok(())
    }
}

fn check_virtual_capacity(
    physical_capacity: Option<DataRate>,
    virtual_capacity: DataRate,
) -> Result<(), CapacityError> {
    let Some(physical_capacity) = physical_capacity else {
        return Err(CapacityError::NoPhysicalCapacity);
    };
    if virtual_capacity.is_zero() {
        return Err(CapacityError::ZeroVirtualCapacity);
    }
    if virtual_capacity > physical_capacity {
        return Err(CapacityError::ExceedsPhysical {
            virtual_capacity,
            physical_capacity,
        });
    }
    Ok(())
}

impl Default for LinkConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsBuilder for LinkConfigBuilder {
    type Stats = LinkConfigStats;

    fn build(&self) -> LinkConfigStats {
        LinkConfigStats {
            physical_capacity: Stat::from_timed(self.physical_capacity, Trust::Safe),
            virtual_capacity: Stat::from_timed(self.virtual_capacity, Trust::Safe),
            updates: self.updates,
        }
    }
}
