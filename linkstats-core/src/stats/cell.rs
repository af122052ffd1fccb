use crate::stats::{CoreStats, StatsBuilder};
use log::trace;
use std::{
    any::type_name,
    convert::Infallible,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

/// A [`StatsBuilder`] behind a mutation lock, and its latest snapshot
///
/// Updates are serialized by the builder lock: mutate the builder, build
/// the new snapshot, swap it in. [`StatsCell::freeze`] only takes the
/// snapshot read lock for the time of an [`Arc`] clone, so readers never
/// wait for a builder and never observe a half built snapshot.
///
/// ```
/// # use linkstats_core::stats::{LldpProbingBuilder, StatsCell};
/// # use linkstats_core::{measure::Latency, stat::Timed, summary::ThresholdFactor};
/// # use linkstats_core::calculator::Update;
/// # use std::{num::NonZeroUsize, time::{Duration, SystemTime}};
/// let cell = StatsCell::new(LldpProbingBuilder::new(
///     NonZeroUsize::new(3).unwrap(),
///     ThresholdFactor::default(),
/// ));
///
/// let latency = Timed::now(Latency::new(Duration::from_millis(3)));
/// assert!(cell.update(|builder| builder.apply(Update::Round(latency))));
///
/// let before = cell.freeze();
/// assert!(std::sync::Arc::ptr_eq(&before, &cell.freeze()));
/// ```
pub struct StatsCell<B: StatsBuilder> {
    builder: Mutex<B>,
    latest: RwLock<Arc<B::Stats>>,
}

impl<B: StatsBuilder> StatsCell<B> {
    pub fn new(builder: B) -> Self {
        let latest = Arc::new(builder.build());
        Self {
            builder: Mutex::new(builder),
            latest: RwLock::new(latest),
        }
    }

    /// the latest published snapshot
    pub fn freeze(&self) -> Arc<B::Stats> {
        let latest = self.latest.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&latest)
    }

    /// mutate the builder and publish a new snapshot
    ///
    /// returns `true` if the core stats of the new snapshot differ from
    /// the previous one.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut B),
    {
        let result = self.try_update(|builder| {
            f(builder);
            Ok::<(), Infallible>(())
        });
        match result {
            Ok(changed) => changed,
            Err(infallible) => match infallible {},
        }
    }

    /// same as [`StatsCell::update`] for mutations that may be rejected
    ///
    /// On error nothing is published. The mutation must leave the
    /// builder untouched when it fails.
    pub fn try_update<F, E>(&self, f: F) -> Result<bool, E>
    where
        F: FnOnce(&mut B) -> Result<(), E>,
    {
        let mut builder = self.builder.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut builder)?;

        let stats = Arc::new(builder.build());
        let mut latest = self.latest.write().unwrap_or_else(PoisonError::into_inner);
        let changed = !latest.has_same_core_stats(&stats);
        *latest = stats;

        trace!(
            "published new {} (core stats changed: {changed})",
            short_type_name::<B::Stats>()
        );

        Ok(changed)
    }
}

fn short_type_name<T>() -> &'static str {
    let name = type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::atomic::{AtomicU64, Ordering},
        thread,
    };

    #[derive(Debug, PartialEq)]
    struct Counter {
        value: u64,
        noise: u64,
    }

    impl CoreStats for Counter {
        fn has_same_core_stats(&self, other: &Self) -> bool {
            self.value == other.value
        }
    }

    #[derive(Default)]
    struct CounterBuilder {
        value: u64,
        noise: u64,
    }

    impl StatsBuilder for CounterBuilder {
        type Stats = Counter;

        fn build(&self) -> Counter {
            Counter {
                value: self.value,
                noise: self.noise,
            }
        }
    }

    #[test]
    fn reports_core_changes_only() {
        let cell = StatsCell::new(CounterBuilder::default());

        assert!(cell.update(|b| b.value = 1));
        assert!(!cell.update(|b| b.noise = 7));
        assert_eq!(*cell.freeze(), Counter { value: 1, noise: 7 });
    }

    #[test]
    fn freeze_is_idempotent() {
        let cell = StatsCell::new(CounterBuilder::default());
        cell.update(|b| b.value = 3);

        let a = cell.freeze();
        let b = cell.freeze();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn rejected_update_publishes_nothing() {
        let cell = StatsCell::new(CounterBuilder::default());
        let before = cell.freeze();

        let result = cell.try_update(|_| Err("rejected"));
        assert_eq!(result, Err("rejected"));
        assert!(Arc::ptr_eq(&before, &cell.freeze()));
    }

    #[test]
    fn concurrent_updates_are_serialized() {
        let cell = Arc::new(StatsCell::new(CounterBuilder::default()));
        let changes = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let changes = Arc::clone(&changes);
                thread::spawn(move || {
                    for _ in 0..250 {
                        if cell.update(|b| b.value += 1) {
                            changes.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cell.freeze().value, 1_000);
        assert_eq!(changes.load(Ordering::SeqCst), 1_000);
    }
}
