// Benchmarks for the real-time click path
//
// The pull path runs on the audio thread once per buffer period, so it is
// the one place regressions hurt. Track building runs on the control thread
// but gates how fast tempo changes land.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tactus::metronome::{
    ClickSounds, ClickTrack, DriftPolicy, Tempo, TimeSignature, WindowGenerator,
};

fn build_track(bpm: f64) -> ClickTrack {
    let sounds = ClickSounds::synthesized(48000);
    ClickTrack::build(
        Tempo::new(bpm).unwrap(),
        TimeSignature::four_four(),
        48000,
        &sounds,
    )
    .unwrap()
}

fn bench_pull(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_pull");

    for &frames in &[256usize, 512, 1024] {
        group.bench_function(format!("{}_frames", frames), |b| {
            let mut generator = WindowGenerator::new(build_track(145.0), DriftPolicy::default());
            let mut buffer = vec![0.0f32; frames];
            b.iter(|| {
                generator.pull(black_box(&mut buffer));
            });
        });
    }

    group.finish();
}

fn bench_track_build(c: &mut Criterion) {
    let sounds = ClickSounds::synthesized(48000);

    c.bench_function("click_track_build", |b| {
        b.iter(|| {
            let track = ClickTrack::build(
                Tempo::new(black_box(145.0)).unwrap(),
                TimeSignature::four_four(),
                48000,
                &sounds,
            )
            .unwrap();
            black_box(track);
        });
    });
}

fn bench_tempo_change(c: &mut Criterion) {
    c.bench_function("install_track_mid_bar", |b| {
        let mut generator = WindowGenerator::new(build_track(120.0), DriftPolicy::default());
        let mut buffer = vec![0.0f32; 48000];
        generator.pull(&mut buffer);

        let slow = build_track(120.0);
        let fast = build_track(145.0);
        b.iter(|| {
            generator.install(black_box(fast.clone()));
            generator.install(black_box(slow.clone()));
        });
    });
}

criterion_group!(benches, bench_pull, bench_track_build, bench_tempo_change);
criterion_main!(benches);
