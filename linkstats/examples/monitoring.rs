//! Monitoring example: feed the manager with samples and print the
//! statistics changes it reports.
//!
//! A link between two switches appears, is probed for a few rounds while
//! a flow crosses it, and disappears.
//!
//! Run with:
//!   cargo run --example monitoring -p linkstats

use anyhow::Result;
use linkstats::{
    DatapathLink, Flow, FlowedLinkStats, GeneralLinkStats, LinkStatisticsManager,
    LinkStatsListener, StatsConfiguration, Timed, TopologyLinkEvent,
};
use linkstats_core::sample::{
    PacketSummary, SecureProbingResult, SecureProbingSample, TrafficCount, TrajectoryResult,
    TrajectorySample,
};
use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

struct Printer;

impl LinkStatsListener for Printer {
    fn general_updated(&self, stats: &GeneralLinkStats) {
        println!("general stats updated:\n{stats}\n");
    }

    fn flowed_updated(&self, stats: &FlowedLinkStats) {
        println!("flowed stats updated:\n{stats}\n");
    }

    fn general_cleared(&self, last: &GeneralLinkStats) {
        println!("link {} is gone", last.link());
    }

    fn flowed_cleared(&self, last: &FlowedLinkStats) {
        println!("flowed-link {} is gone", last.link());
    }
}

fn secure_probe(link: DatapathLink, round: u64, delay: Duration) -> SecureProbingSample {
    let sent = SystemTime::now();
    let probe = PacketSummary::new(0xC0FFEE + round, 128);

    SecureProbingSample::new(
        link,
        SecureProbingResult {
            source: Some(Timed::new(probe, sent)),
            destination: Some(Timed::new(probe, sent + delay)),
            collect_duration: Duration::from_millis(500),
            collect_finished: sent + Duration::from_millis(500),
        },
    )
}

/// `packets` mirrored packets sent 1ms apart, every `lose_every`th one lost
fn trajectory(
    link: DatapathLink,
    flow: &Flow,
    packets: u64,
    lose_every: u64,
) -> TrajectorySample {
    let start = SystemTime::now();
    let mut source = Vec::new();
    let mut destination = Vec::new();

    for i in 0..packets {
        let packet = PacketSummary::new(i, 1_500);
        let sent = start + Duration::from_millis(i);
        source.push(Timed::new(packet, sent));
        if (i + 1) % lose_every != 0 {
            destination.push(Timed::new(packet, sent + Duration::from_millis(3)));
        }
    }

    TrajectorySample::new(
        link.flowed(flow.clone()),
        TrajectoryResult {
            source_summaries: source,
            source_unmatched: TrafficCount::ZERO,
            destination_summaries: destination,
            destination_unmatched: TrafficCount::ZERO,
            collect_duration: Duration::from_secs(1),
            collect_finished: start + Duration::from_secs(1),
        },
    )
}

fn main() -> Result<()> {
    let config = StatsConfiguration::from_params([
        ("secure_probing_latency_window", "4"),
        ("hysteresis_percentage", "10"),
    ])?;
    let manager = LinkStatisticsManager::new(config);
    manager.add_listener(Arc::new(Printer));

    let link: DatapathLink = "00:00:00:00:00:00:00:01[1] > 00:00:00:00:00:00:00:02[3]".parse()?;
    let flow: Flow = "eth_type=0x0800".parse()?;

    manager.on_link_event(&TopologyLinkEvent::added(link, Some("1Gbps".parse()?)));
    manager.update_virtual_capacity(link, Timed::now(Some("400Mbps".parse()?)))?;

    for (round, millis) in [4, 5, 4, 9, 12, 12].into_iter().enumerate() {
        let delay = Duration::from_millis(millis);
        let updated = manager.update_general_stats(secure_probe(link, round as u64, delay));
        println!("secure probe of {millis}ms, reported: {updated}");
    }

    for lose_every in [100, 100, 10] {
        manager.update_flowed_stats(trajectory(link, &flow, 200, lose_every));
    }

    if let Some(stats) = manager.flowed_stats(&link.flowed(flow)) {
        println!("throughput: {}", stats.throughput());
        println!("available bandwidth: {}", stats.available_bandwidth());
        println!("utilization: {}", stats.data_utilization());
    }

    manager.on_link_event(&TopologyLinkEvent::removed(link));

    Ok(())
}
