use linkstats_core::{
    defaults::{DEFAULT_HYSTERESIS_THRESHOLD, DEFAULT_WINDOW_SIZE},
    summary::{ThresholdFactor, ThresholdFactorParseError},
};
use std::num::{NonZeroUsize, ParseIntError};
use thiserror::Error;

/// Window sizes and hysteresis threshold of the statistics
///
/// Every latency, loss and drop rate series is averaged over its own
/// window. The hysteresis threshold is shared by all of them.
///
/// ```
/// # use linkstats::StatsConfiguration;
/// # use std::num::NonZeroUsize;
/// let config = StatsConfiguration::default()
///     .with_trajectory_latency_window(NonZeroUsize::new(10).unwrap());
///
/// assert_eq!(config.trajectory_latency_window.get(), 10);
/// assert_eq!(config.lldp_latency_window.get(), 3);
/// assert_eq!(config.hysteresis.to_string(), "5%");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsConfiguration {
    pub lldp_latency_window: NonZeroUsize,
    pub secure_probing_latency_window: NonZeroUsize,
    pub secure_probing_loss_window: NonZeroUsize,
    pub trajectory_latency_window: NonZeroUsize,
    pub trajectory_loss_window: NonZeroUsize,
    pub packet_drop_rate_window: NonZeroUsize,
    pub hysteresis: ThresholdFactor,
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid window size for `{key}': {source}")]
    WindowSize {
        key: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Invalid hysteresis percentage `{value}': {source}")]
    Hysteresis {
        value: String,
        #[source]
        source: ThresholdFactorParseError,
    },

    #[error("Unknown configuration key `{0}'")]
    UnknownKey(String),
}

impl StatsConfiguration {
    pub const LLDP_LATENCY_WINDOW: &'static str = "lldp_latency_window";
    pub const SECURE_PROBING_LATENCY_WINDOW: &'static str = "secure_probing_latency_window";
    pub const SECURE_PROBING_LOSS_WINDOW: &'static str = "secure_probing_loss_window";
    pub const TRAJECTORY_LATENCY_WINDOW: &'static str = "trajectory_latency_window";
    pub const TRAJECTORY_LOSS_WINDOW: &'static str = "trajectory_loss_window";
    pub const PACKET_DROP_RATE_WINDOW: &'static str = "packet_drop_rate_window";
    pub const HYSTERESIS_PERCENTAGE: &'static str = "hysteresis_percentage";

    /// Read the configuration from already loaded `key = value` pairs
    ///
    /// Missing keys keep their default value. The hysteresis is a
    /// percentage, with or without the `%` suffix (`5` or `5%`).
    ///
    /// ```
    /// # use linkstats::StatsConfiguration;
    /// let config = StatsConfiguration::from_params([
    ///     ("secure_probing_loss_window", "10"),
    ///     ("hysteresis_percentage", "20"),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(config.secure_probing_loss_window.get(), 10);
    /// assert_eq!(config.hysteresis.value(), 0.2);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on unknown keys, on window sizes that are not strictly
    /// positive integers, and on percentages outside `(0, 100]`.
    pub fn from_params<'a, I>(params: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();

        for (key, value) in params {
            let key = key.trim();
            let value = value.trim();

            let window = match key {
                Self::LLDP_LATENCY_WINDOW => &mut config.lldp_latency_window,
                Self::SECURE_PROBING_LATENCY_WINDOW => &mut config.secure_probing_latency_window,
                Self::SECURE_PROBING_LOSS_WINDOW => &mut config.secure_probing_loss_window,
                Self::TRAJECTORY_LATENCY_WINDOW => &mut config.trajectory_latency_window,
                Self::TRAJECTORY_LOSS_WINDOW => &mut config.trajectory_loss_window,
                Self::PACKET_DROP_RATE_WINDOW => &mut config.packet_drop_rate_window,
                Self::HYSTERESIS_PERCENTAGE => {
                    config.hysteresis = parse_percentage(value)?;
                    continue;
                }
                unknown => return Err(ConfigurationError::UnknownKey(unknown.to_owned())),
            };

            *window = value
                .parse()
                .map_err(|source| ConfigurationError::WindowSize {
                    key: key.to_owned(),
                    source,
                })?;
        }

        Ok(config)
    }

    pub fn with_lldp_latency_window(mut self, window: NonZeroUsize) -> Self {
        self.lldp_latency_window = window;
        self
    }

    pub fn with_secure_probing_latency_window(mut self, window: NonZeroUsize) -> Self {
        self.secure_probing_latency_window = window;
        self
    }

    pub fn with_secure_probing_loss_window(mut self, window: NonZeroUsize) -> Self {
        self.secure_probing_loss_window = window;
        self
    }

    pub fn with_trajectory_latency_window(mut self, window: NonZeroUsize) -> Self {
        self.trajectory_latency_window = window;
        self
    }

    pub fn with_trajectory_loss_window(mut self, window: NonZeroUsize) -> Self {
        self.trajectory_loss_window = window;
        self
    }

    pub fn with_packet_drop_rate_window(mut self, window: NonZeroUsize) -> Self {
        self.packet_drop_rate_window = window;
        self
    }

    pub fn with_hysteresis(mut self, hysteresis: ThresholdFactor) -> Self {
        self.hysteresis = hysteresis;
        self
    }
}

fn parse_percentage(value: &str) -> Result<ThresholdFactor, ConfigurationError> {
    let parsed = if value.ends_with('%') {
        value.parse()
    } else {
        format!("{value}%").parse()
    };

    parsed.map_err(|source| ConfigurationError::Hysteresis {
        value: value.to_owned(),
        source,
    })
}

impl Default for StatsConfiguration {
    fn default() -> Self {
        Self {
            lldp_latency_window: DEFAULT_WINDOW_SIZE,
            secure_probing_latency_window: DEFAULT_WINDOW_SIZE,
            secure_probing_loss_window: DEFAULT_WINDOW_SIZE,
            trajectory_latency_window: DEFAULT_WINDOW_SIZE,
            trajectory_loss_window: DEFAULT_WINDOW_SIZE,
            packet_drop_rate_window: DEFAULT_WINDOW_SIZE,
            hysteresis: DEFAULT_HYSTERESIS_THRESHOLD,
        }
    }
}
