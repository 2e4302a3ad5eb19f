//! Criterion benchmarks for pixedit critical paths
//!
//! Benchmarks the operations every edit re-runs:
//! - Pixelate: downscale, quantize, dither, upscale
//! - Palette: median cut over the rendered image
//! - Editor: paint and undo against a live session

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};
use pixedit::dither::Dither;
use pixedit::palette::derive_palette;
use pixedit::resample::pixelate;
use pixedit::{EditorSettings, PixelEditor};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Smooth two-axis gradient with a little high-frequency noise
fn make_photo(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let noise = (x.wrapping_mul(31) ^ y.wrapping_mul(17)) % 24;
        Rgba([
            ((x * 255 / width.max(1)) as u8).saturating_add(noise as u8),
            (y * 255 / height.max(1)) as u8,
            (((x + y) * 127 / (width + height).max(1)) as u8).saturating_add(64),
            255,
        ])
    })
}

// =============================================================================
// Pixelate Benchmarks
// =============================================================================

fn bench_pixelate(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixelate");
    let photo = make_photo(640, 480);
    group.throughput(Throughput::Elements(640 * 480));

    for block in [2u32, 6, 16].iter() {
        group.bench_with_input(BenchmarkId::new("floyd_steinberg", block), block, |b, &block| {
            b.iter(|| pixelate(black_box(&photo), block, 4, Dither::FloydSteinberg))
        });
    }

    group.bench_function("ordered_8x8_block_6", |b| {
        b.iter(|| pixelate(black_box(&photo), 6, 4, Dither::Ordered8x8))
    });

    group.bench_function("colors_32_block_6", |b| {
        b.iter(|| pixelate(black_box(&photo), 6, 32, Dither::FloydSteinberg))
    });

    group.finish();
}

// =============================================================================
// Palette Benchmarks
// =============================================================================

fn bench_palette(c: &mut Criterion) {
    let mut group = c.benchmark_group("palette");

    for colors in [4usize, 16, 64].iter() {
        let rendered = pixelate(&make_photo(640, 480), 2, *colors, Dither::FloydSteinberg)
            .expect("bench image fits the block");
        group.bench_with_input(BenchmarkId::new("derive", colors), colors, |b, &colors| {
            b.iter(|| derive_palette(black_box(&rendered), colors))
        });
    }

    group.finish();
}

// =============================================================================
// Editor Benchmarks
// =============================================================================

fn bench_editor(c: &mut Criterion) {
    let mut group = c.benchmark_group("editor");
    let editor = PixelEditor::from_image(make_photo(640, 480), "bench.png", EditorSettings::default())
        .expect("bench image fits the block");

    group.bench_function("paint_then_undo", |b| {
        let mut editor = editor.clone();
        b.iter(|| {
            editor.paint(black_box(320), black_box(240));
            editor.undo()
        })
    });

    group.bench_function("change_block_size", |b| {
        let mut editor = editor.clone();
        let mut size = 6;
        b.iter(|| {
            size = if size == 6 { 7 } else { 6 };
            editor.change_block_size(black_box(size))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pixelate, bench_palette, bench_editor);
criterion_main!(benches);
