use std::hint::black_box;
use std::time::Instant;

use glam::DVec2;
use voidspace_common::SectorCoord;
use voidspace_kernel::{CountRange, SectorGenerator, Tunables, WorldSeed};
use voidspace_stream::{KinematicSampler, SectorStreamer, StreamConfig};

fn bench_generate(label: &str, tunables: Tunables, iterations: usize) {
    let generator = SectorGenerator::new(WorldSeed(42), tunables).expect("valid tunables");

    let start = Instant::now();
    let mut skipped = 0;
    for i in 0..iterations {
        let coord = SectorCoord::new(i as i32, -(i as i32));
        let sector = black_box(generator.generate(black_box(coord)));
        skipped += sector.report.total_skipped();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  generate [{label}] ({iterations} sectors): {per_iter:?}/sector, total {elapsed:?}, skipped {skipped}"
    );
}

fn bench_stream_walk(config: StreamConfig, steps: usize) {
    let generator =
        SectorGenerator::new(WorldSeed(42), Tunables::default()).expect("valid tunables");
    let sector_size = generator.sector_size();
    let mut streamer = SectorStreamer::new(generator, config).expect("valid stream config");

    let start = Instant::now();
    let mut generated = 0;
    for i in 0..steps {
        // Viewer drifts diagonally, crossing a boundary every ten steps.
        let pos = DVec2::splat(i as f64 * sector_size / 10.0);
        generated += black_box(streamer.update(black_box(pos))).generated.len();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / steps as u32;
    println!(
        "  stream walk (load r={}, retain r={}, {steps} steps): {per_iter:?}/step, total {elapsed:?}, generated {generated}",
        config.load_radius, config.retain_radius
    );
}

fn bench_visible(iterations: usize) {
    let generator =
        SectorGenerator::new(WorldSeed(42), Tunables::default()).expect("valid tunables");
    let mut streamer =
        SectorStreamer::new(generator, StreamConfig::default()).expect("valid stream config");
    let pos = DVec2::new(2500.0, 2500.0);

    let start = Instant::now();
    for i in 0..iterations {
        let sampler = KinematicSampler::at(i as f64, i as f64);
        let _ = black_box(streamer.visible_objects(pos, 4000.0, &sampler));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  visible objects ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Sector Streaming Benchmarks ===\n");

    println!("Sector generation:");
    bench_generate("default", Tunables::default(), 1000);
    let mut dense = Tunables::default();
    dense.asteroids.count = CountRange::new(150, 200);
    bench_generate("dense asteroids", dense, 100);

    println!("\nStreaming walk:");
    bench_stream_walk(StreamConfig::default(), 1000);
    bench_stream_walk(
        StreamConfig {
            load_radius: 2,
            retain_radius: 3,
        },
        1000,
    );

    println!("\nVisible objects:");
    bench_visible(1000);

    println!("\n=== Done ===");
}
