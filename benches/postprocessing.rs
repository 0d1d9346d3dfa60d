use bgremove::{
    BackgroundRemover, ImagePreprocessor, Letterbox, MockRemover, PreprocessingConfig,
    SegmentationMask,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::Array4;
use std::io::Cursor;

const SIZES: [(u32, u32); 3] = [(320, 320), (1024, 768), (1920, 1080)];

fn test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn soft_mask(size: usize) -> Array4<f32> {
    let center = (size as f32 - 1.0) / 2.0;
    Array4::from_shape_fn((1, 1, size, size), |(_, _, y, x)| {
        let dx = (x as f32 - center) / center;
        let dy = (y as f32 - center) / center;
        (1.0 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0)
    })
}

fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");
    let config = PreprocessingConfig::default();

    for (width, height) in SIZES {
        let image = test_image(width, height);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &image,
            |b, image| {
                b.iter(|| {
                    ImagePreprocessor::preprocess(black_box(image), &config, [0, 0, 0])
                        .expect("preprocessing failed")
                });
            },
        );
    }
    group.finish();
}

fn bench_mask_application(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_application");
    let tensor = soft_mask(320);

    for (width, height) in SIZES {
        let image = test_image(width, height);
        let letterbox = Letterbox::fit((width, height), (320, 320)).expect("letterbox failed");

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &image,
            |b, image| {
                b.iter(|| {
                    let mask = SegmentationMask::from_tensor(&tensor, (width, height), &letterbox)
                        .expect("mask generation failed");
                    mask.apply_to_image(black_box(image))
                        .expect("mask application failed")
                });
            },
        );
    }
    group.finish();
}

fn bench_mock_pipeline(c: &mut Criterion) {
    let mut buffer = Vec::new();
    test_image(1024, 768)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .expect("encoding failed");
    let mut remover = MockRemover::mock();

    c.bench_function("mock_pipeline_1024x768", |b| {
        b.iter(|| remover.remove(black_box(&buffer)).expect("removal failed"));
    });
}

criterion_group!(
    benches,
    bench_preprocessing,
    bench_mask_application,
    bench_mock_pipeline
);
criterion_main!(benches);
