use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rasterfilt_image::{Channels, Raster};
use rasterfilt_imgproc::{
    filter::kernels::FilterKind,
    filter::filter_with_kernel,
    parallel::{FilterOptions, Strategy},
};

fn create_test_raster(width: usize, height: usize) -> Raster {
    let mut rng = StdRng::seed_from_u64(42);
    let data = (0..width * height * 3)
        .map(|_| rng.random_range(0..=255))
        .collect();
    Raster::new([width, height].into(), Channels::Rgb, 255, data).unwrap()
}

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("Filter3x3");
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));
        let src = create_test_raster(*width, *height);

        for kind in [FilterKind::Blur, FilterKind::Sharpening] {
            let kernel = kind.kernel();
            for strategy in Strategy::ALL {
                let options = FilterOptions::new(strategy, workers);
                let parameter_string = format!("{}x{}/{}", width, height, kind);

                group.bench_with_input(
                    BenchmarkId::new(strategy.name(), &parameter_string),
                    &src,
                    |b, src| b.iter(|| black_box(filter_with_kernel(src, &kernel, &options))),
                );
            }
        }
    }
    group.finish();
}

criterion_group!(benches, bench_filters);
criterion_main!(benches);
