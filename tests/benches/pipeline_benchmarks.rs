//! # Caterer Pipeline Benchmarks
//!
//! | Stage | Input |
//! |-------|-------|
//! | Engine | Random 64x64 soup, 100 generations |
//! | Frame builder | Glider gun script, 60 frames |
//! | GIF encoder | Pre-built frame sets of growing size |

use caterer_tests::integration::fixtures::engine;
use cat_02_frame_builder::FrameBuilder;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::Cell;
use std::time::Duration;

const GOSPER_GUN: &str = "x = 36, y = 9, rule = B3/S23\n\
24bo$22bobo$12b2o6b2o12b2o$11bo3bo4b2o12b2o$2o8bo5bo3b2o$2o8bo3bob2o4bobo$\
10bo5bo7bo$11bo3bo$12b2o!\n";

fn soup(size: i64, seed: u64) -> Vec<Cell> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .filter(|_| rng.gen_bool(0.5))
        .map(|(x, y)| Cell::new(x, y, 1))
        .collect()
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("sim-engine");
    let engine = engine();
    let cells = soup(64, 7);

    group.bench_function("soup_64_run_100", |b| {
        b.iter(|| {
            let mut pattern = engine.create_pattern("B3/S23", &cells).unwrap();
            pattern.run(100);
            black_box(pattern.population())
        })
    });
    group.finish();
}

fn bench_frame_builder(c: &mut Criterion) {
    let mut group = c.benchmark_group("cat-02-frame-builder");
    group.measurement_time(Duration::from_secs(10));
    let engine = engine();
    let builder = FrameBuilder::new(engine.clone());

    group.bench_function("gosper_gun_60_frames", |b| {
        b.iter(|| {
            let pattern = engine.parse_pattern(GOSPER_GUN).unwrap();
            black_box(builder.build(pattern, &["60"]).unwrap().frames.len())
        })
    });
    group.finish();
}

fn bench_gif_encoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("cat-01-gif-encoder");
    let engine = engine();
    let builder = FrameBuilder::new(engine.clone());

    for frames in [10u32, 50, 150] {
        let pattern = engine.parse_pattern(GOSPER_GUN).unwrap();
        let set = builder.build(pattern, &[frames.to_string()]).unwrap();
        group.throughput(Throughput::Elements(u64::from(frames)));
        group.bench_with_input(BenchmarkId::new("encode", frames), &set, |b, set| {
            b.iter(|| black_box(set.encode().unwrap().len()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_engine, bench_frame_builder, bench_gif_encoder);
criterion_main!(benches);
