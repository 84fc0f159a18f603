//! Benchmarks for pixel buffer construction, bitmap decoding and compositing.
//!
//! Run with: cargo bench --package raster-layer --bench pixel_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use field_common::{GridParams, LatLng, RegularGrid, ScalarField};
use raster_layer::compositor::draw_image;
use raster_layer::pixels::build_pixel_buffer;
use raster_layer::{
    png, ColorFn, DecodedBitmap, GridAnchors, PixmapHost, WebMercatorViewport,
};
use test_utils::create_temperature_grid;

fn temperature_field(width: usize, height: usize) -> RegularGrid {
    let cellsize = 360.0 / width as f64;
    let params = GridParams::new(width, height, -180.0, -80.0, cellsize);
    RegularGrid::new(params, create_temperature_grid(width, height)).unwrap()
}

fn bench_build_pixel_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_pixel_buffer");

    // Below and above the parallel threshold
    let sizes = [(128, 64), (360, 180), (1440, 721)];

    for (width, height) in sizes {
        let field = temperature_field(width, height);
        let scale = ColorFn::default_for_range(field.range());
        let closure = ColorFn::function(|v| {
            let t = ((v + 20.0) / 50.0).clamp(0.0, 1.0);
            field_common::Color::rgb((t * 255.0) as u8, 0, ((1.0 - t) * 255.0) as u8)
        });

        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_with_input(
            BenchmarkId::new("scale", format!("{}x{}", width, height)),
            &field,
            |b, field| b.iter(|| build_pixel_buffer(black_box(field), &scale).unwrap()),
        );
        group.bench_with_input(
            BenchmarkId::new("function", format!("{}x{}", width, height)),
            &field,
            |b, field| b.iter(|| build_pixel_buffer(black_box(field), &closure).unwrap()),
        );
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_bitmap");

    for (width, height) in [(360, 180), (1440, 721)] {
        let field = temperature_field(width, height);
        let pixels = build_pixel_buffer(&field, &ColorFn::default_for_range(field.range())).unwrap();

        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &pixels,
            |b, pixels| b.iter(|| DecodedBitmap::decode(pixels.clone(), width, height).unwrap()),
        );
    }

    group.finish();
}

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");

    let field = temperature_field(360, 180);
    let pixels = build_pixel_buffer(&field, &ColorFn::default_for_range(field.range())).unwrap();
    let bitmap = DecodedBitmap::decode(pixels, 360, 180).unwrap();
    let anchors = GridAnchors::from_field(&field);

    for (width, height) in [(512, 512), (1024, 768)] {
        let viewport = WebMercatorViewport::new(LatLng::new(20.0, 0.0), 2.0, width, height);
        let mut host = PixmapHost::new(viewport).unwrap();

        group.bench_function(format!("{}x{}", width, height), |b| {
            b.iter(|| {
                host.surface_mut().clear();
                draw_image(&mut host, &anchors, Some(&bitmap))
            })
        });
    }

    group.finish();
}

fn bench_png_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_export");

    let field = temperature_field(360, 180);
    let pixels = build_pixel_buffer(&field, &ColorFn::default_for_range(field.range())).unwrap();

    group.throughput(Throughput::Bytes(pixels.len() as u64));
    group.bench_function("360x180", |b| {
        b.iter(|| png::encode_rgba(black_box(&pixels), 360, 180).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_build_pixel_buffer,
    bench_decode,
    bench_composite,
    bench_png_export
);
criterion_main!(benches);
