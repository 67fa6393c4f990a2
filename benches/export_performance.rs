use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use f1replay::session::{DriverEntry, Lap, RaceSession, RawSample};
use f1replay::telemetry::{downsample, synchronize_session};
use f1replay::writer::encode_bundle;
use f1replay::{ExportOptions, TeamColorResolver, build_bundle};
use std::num::NonZeroUsize;
use std::time::Duration;

/// A race-like session: 20 drivers sampling at slightly different cadences
fn create_sample_session(samples_per_driver: usize) -> RaceSession {
    let mut session = RaceSession::default();
    for d in 0..20usize {
        let code = format!("D{:02}", d);
        session.drivers.push(DriverEntry {
            number: d.to_string(),
            abbreviation: code.clone(),
            team_name: "McLaren".to_string(),
            full_name: code.clone(),
            team_color: None,
        });
        // ~4Hz with a per-driver phase offset, so timestamps rarely coincide
        let offset = d as f64 * 0.013;
        let samples = (0..samples_per_driver)
            .map(|i| {
                let t = i as f64 * 0.27 + offset;
                RawSample {
                    time: t,
                    x: Some((t * 0.05).cos() * 1000.0),
                    y: Some((t * 0.05).sin() * 1000.0),
                    lap: 1 + (t / 90.0) as u32,
                    tyre: 2,
                    speed: Some(250.0 + (t * 0.3).sin() * 50.0),
                    gear: 7,
                    drs: 0,
                    position: Some(d as u32 + 1),
                }
            })
            .collect();
        session.telemetry.insert(code, samples);
    }
    session.laps.push(Lap {
        driver: "D00".to_string(),
        number: 1,
        start_time: 0.0,
        lap_time: Some(90.0),
    });
    session
}

fn bench_synchronize(c: &mut Criterion) {
    let mut group = c.benchmark_group("synchronizer");
    group.measurement_time(Duration::from_secs(10));

    for samples in [1_000usize, 5_000] {
        let session = create_sample_session(samples);
        group.bench_with_input(
            BenchmarkId::new("synchronize_session", samples),
            &session,
            |b, session| b.iter(|| black_box(synchronize_session(session))),
        );
    }
    group.finish();
}

fn bench_downsample(c: &mut Criterion) {
    let mut group = c.benchmark_group("downsampler");
    let frames = synchronize_session(&create_sample_session(1_000));
    let stride = NonZeroUsize::new(50).unwrap();

    group.bench_function("downsample_stride_50", |b| {
        b.iter(|| black_box(downsample(frames.clone(), stride)))
    });
    group.finish();
}

fn bench_full_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    let session = create_sample_session(1_000);
    let resolver = TeamColorResolver::new();
    let options = ExportOptions {
        year: 2025,
        sample_rate: NonZeroUsize::new(50).unwrap(),
    };

    group.bench_function("build_and_encode", |b| {
        b.iter(|| {
            let bundle = build_bundle(&session, &resolver, options);
            black_box(encode_bundle(&bundle).unwrap())
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_synchronize,
    bench_downsample,
    bench_full_export
);
criterion_main!(benches);
