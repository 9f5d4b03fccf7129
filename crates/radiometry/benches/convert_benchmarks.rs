//! Benchmarks for radiometric conversion.
//!
//! Run with: cargo bench --package radiometry --bench convert_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use radiometry::{
    lookup, to_radiance, to_reflectance, AcquisitionTime, BandImage, ConversionContext,
    ConversionMode, RadiometricConverter, WORLDVIEW2_BANDS,
};
use test_utils::create_dn_scene;

// =============================================================================
// ACQUISITION TIME BENCHMARKS
// =============================================================================

fn bench_acquisition_time(c: &mut Criterion) {
    c.bench_function("acquisition_time/from_utc", |b| {
        b.iter(|| AcquisitionTime::from_utc(black_box("2014_11_12T16:47:08.000000Z;")))
    });
}

// =============================================================================
// PER-PIXEL CONVERSION BENCHMARKS
// =============================================================================

fn bench_pixel_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixel_conversion");
    let entry = lookup("Green").unwrap();

    for size in [256usize, 1024, 2048] {
        let dn = BandImage::new(create_dn_scene(size, size, 42), size, size).unwrap();
        let radiance = to_radiance(&dn, &entry);

        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("radiance", size), &dn, |b, dn| {
            b.iter(|| to_radiance(black_box(dn), &entry))
        });
        group.bench_with_input(
            BenchmarkId::new("reflectance", size),
            &radiance,
            |b, radiance| b.iter(|| to_reflectance(black_box(radiance), &entry, 0.99, 36.2)),
        );
    }

    group.finish();
}

// =============================================================================
// MULTI-BAND BENCHMARKS
// =============================================================================

fn bench_convert_bands(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_bands");
    let size = 1024;

    let inputs: Vec<(String, BandImage)> = WORLDVIEW2_BANDS
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let data = create_dn_scene(size, size, i as u32);
            (band.to_string(), BandImage::new(data, size, size).unwrap())
        })
        .collect();

    for mode in [ConversionMode::Radiance, ConversionMode::Reflectance] {
        let context = ConversionContext::new(0.99, 53.8, vec![], mode).unwrap();
        let converter = RadiometricConverter::new(context);

        group.throughput(Throughput::Elements((size * size * inputs.len()) as u64));
        group.bench_function(BenchmarkId::new("all_bands", mode.to_string()), |b| {
            b.iter(|| converter.convert_bands(black_box(&inputs)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_acquisition_time,
    bench_pixel_conversion,
    bench_convert_bands
);
criterion_main!(benches);
