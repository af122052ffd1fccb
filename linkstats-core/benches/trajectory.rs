use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use linkstats_core::{
    DatapathLink, Flow, NodeId, NodePort, PortId, Timed,
    calculator,
    sample::{PacketSummary, TrafficCount, TrajectoryResult, TrajectorySample},
};
use rand_chacha::ChaChaRng;
use rand_core::{Rng, SeedableRng as _};
use std::time::{Duration, SystemTime};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

/// Mirrored packets with 1% loss, 10% duplicated contents and a
/// delay between 1ms and 5ms.
fn sample(rng: &mut ChaChaRng, packets: usize) -> TrajectorySample {
    let link = DatapathLink::new(
        NodePort::new(NodeId::new(1), PortId::new(1)),
        NodePort::new(NodeId::new(2), PortId::new(3)),
    )
    .flowed(Flow::new("eth_type=0x0800"));

    let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let mut source = Vec::with_capacity(packets);
    let mut destination = Vec::with_capacity(packets);

    for i in 0..packets {
        let digest = if rng.next_u64() % 10 == 0 {
            (i / 2) as u64
        } else {
            rng.next_u64()
        };
        let length = 64 + (rng.next_u64() % 1_436) as u32;
        let packet = PacketSummary::new(digest, length);

        let sent = start + Duration::from_micros(i as u64 * 100);
        source.push(Timed::new(packet, sent));

        if rng.next_u64() % 100 != 0 {
            let delay = Duration::from_micros(1_000 + rng.next_u64() % 4_000);
            destination.push(Timed::new(packet, sent + delay));
        }
    }
    destination.sort_by_key(Timed::timestamp);

    TrajectorySample::new(
        link,
        TrajectoryResult {
            source_summaries: source,
            source_unmatched: TrafficCount::new(1_500, 1),
            destination_summaries: destination,
            destination_unmatched: TrafficCount::ZERO,
            collect_duration: Duration::from_secs(2),
            collect_finished: start + Duration::from_secs(2),
        },
    )
}

fn trajectory(c: &mut Criterion) {
    let mut rng = ChaChaRng::seed_from_u64(0);
    let mut group = c.benchmark_group("trajectory");

    for size in SIZES {
        let sample = sample(&mut rng, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &sample, |b, sample| {
            b.iter(|| calculator::trajectory(black_box(sample)))
        });
    }

    group.finish();
}

criterion_group!(benches, trajectory);
criterion_main!(benches);
