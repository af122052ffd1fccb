use linkstats_core::{FlowedLinkStats, GeneralLinkStats};

/// Receiver of the statistics changes of a [`LinkStatisticsManager`]
///
/// Callbacks run synchronously on the thread that caused the change,
/// while the manager is locked: implementations must return quickly
/// and must not call back into the manager.
///
/// When a change of the general statistics of a link also refreshes
/// its flowed statistics, [`general_updated`] is always delivered
/// before [`flowed_updated_batch`].
///
/// [`LinkStatisticsManager`]: crate::LinkStatisticsManager
/// [`general_updated`]: LinkStatsListener::general_updated
/// [`flowed_updated_batch`]: LinkStatsListener::flowed_updated_batch
pub trait LinkStatsListener: Send + Sync {
    fn general_updated(&self, stats: &GeneralLinkStats);

    fn flowed_updated(&self, stats: &FlowedLinkStats);

    fn flowed_updated_batch(&self, stats: &[FlowedLinkStats]) {
        for stats in stats {
            self.flowed_updated(stats);
        }
    }

    /// the link is gone, `last` are its final statistics
    fn general_cleared(&self, last: &GeneralLinkStats);

    fn flowed_cleared(&self, last: &FlowedLinkStats);

    fn flowed_cleared_batch(&self, last: &[FlowedLinkStats]) {
        for last in last {
            self.flowed_cleared(last);
        }
    }
}
