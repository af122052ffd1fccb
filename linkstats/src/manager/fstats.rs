use crate::{StatsConfiguration, manager::gstats::GeneralCells};
use linkstats_core::{
    FlowedLink, FlowedLinkStats, calculator,
    sample::FlowedSample,
    stats::{StatsCell, SwitchCounterBuilder, TrajectoryBuilder},
};
use std::sync::Arc;

/// Mutable statistics of one flow of a link
pub(crate) struct FStats {
    link: FlowedLink,
    general: Arc<GeneralCells>,
    switch_counter: StatsCell<SwitchCounterBuilder>,
    trajectory: StatsCell<TrajectoryBuilder>,
}

impl FStats {
    pub(crate) fn new(
        link: FlowedLink,
        general: Arc<GeneralCells>,
        config: &StatsConfiguration,
    ) -> Self {
        Self {
            link,
            general,
            switch_counter: StatsCell::new(SwitchCounterBuilder::new(config.hysteresis)),
            trajectory: StatsCell::new(TrajectoryBuilder::new(
                config.trajectory_latency_window,
                config.trajectory_loss_window,
                config.hysteresis,
            )),
        }
    }

    #[inline]
    pub(crate) fn link(&self) -> &FlowedLink {
        &self.link
    }

    pub(crate) fn freeze(&self) -> FlowedLinkStats {
        FlowedLinkStats::new(
            self.link.clone(),
            self.switch_counter.freeze(),
            self.trajectory.freeze(),
            self.general.freeze(),
        )
    }

    pub(crate) fn update(&self, sample: &FlowedSample) -> bool {
        debug_assert_eq!(sample.link(), &self.link);

        match sample {
            FlowedSample::SwitchCounter(sample) => {
                let update = calculator::switch_counter(sample);
                self.switch_counter.update(|builder| builder.apply(update))
            }
            FlowedSample::Trajectory(sample) => {
                let update = calculator::trajectory(sample);
                self.trajectory.update(|builder| builder.apply(update))
            }
        }
    }
}
