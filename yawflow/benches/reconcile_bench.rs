//! Benchmarks for per-scene clip reconciliation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use yawflow::core::{StageName, VoiceClip};
use yawflow::pipeline::{reconcile, validate_scenes};
use yawflow::testing::sample_scenes;

fn reconcile_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for count in [10usize, 100, 1000] {
        let scenes = validate_scenes(sample_scenes(count)).unwrap();
        let clips: Vec<VoiceClip> = (0..count)
            .rev()
            .map(|i| VoiceClip::new(i, format!("voice/scene_{i:04}.wav"), Duration::from_secs(1)))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &clips, |b, clips| {
            b.iter(|| reconcile(StageName::Voice, black_box(&scenes), clips.clone()))
        });
    }

    group.finish();
}

criterion_group!(benches, reconcile_benchmark);
criterion_main!(benches);
