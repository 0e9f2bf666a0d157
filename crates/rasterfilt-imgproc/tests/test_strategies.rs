use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rasterfilt_image::{Channels, Raster};
use rasterfilt_imgproc::{
    filter::{filter, filter_with_report, kernels::FilterKind},
    parallel::Strategy,
    partition::verify_tiling,
    FilterError,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_raster(
    rng: &mut StdRng,
    width: usize,
    height: usize,
    channels: Channels,
    max_sample: i32,
) -> Result<Raster, FilterError> {
    let data = (0..width * height * channels.count())
        .map(|_| rng.random_range(0..=max_sample))
        .collect();
    Ok(Raster::new(
        [width, height].into(),
        channels,
        max_sample,
        data,
    )?)
}

#[test]
fn strategies_are_bit_identical() -> Result<(), FilterError> {
    init_logger();
    let mut rng = StdRng::seed_from_u64(7);

    let shapes = [(1, 1), (1, 9), (9, 1), (2, 2), (5, 3), (16, 11), (33, 20)];
    for (width, height) in shapes {
        for channels in [Channels::Gray, Channels::Rgb] {
            let src = random_raster(&mut rng, width, height, channels, 255)?;

            for kind in FilterKind::ALL {
                let reference = filter(&src, kind.name(), 1, Strategy::Sequential)?;

                for strategy in Strategy::ALL {
                    for workers in 1..=8 {
                        let dst = filter(&src, kind.name(), workers, strategy)?;
                        assert_eq!(
                            dst.as_slice(),
                            reference.as_slice(),
                            "{kind} with {strategy} on {workers} worker(s), {width}x{height}",
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

#[test]
fn small_max_sample_is_respected() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(11);
    let src = random_raster(&mut rng, 12, 7, Channels::Rgb, 15)?;

    for kind in FilterKind::ALL {
        for strategy in Strategy::ALL {
            let dst = filter(&src, kind.name(), 3, strategy)?;
            assert!(dst.as_slice().iter().all(|&v| (0..=15).contains(&v)));
        }
    }
    Ok(())
}

#[test]
fn blur_on_3x3() -> Result<(), FilterError> {
    #[rustfmt::skip]
    let src = Raster::new(
        [3, 3].into(),
        Channels::Gray,
        255,
        vec![
            10, 20, 30,
            40, 50, 60,
            70, 80, 90,
        ],
    )?;

    for strategy in Strategy::ALL {
        let dst = filter(&src, "blur", 2, strategy)?;
        assert_eq!(dst.get(1, 1, 0)?, 50);
        assert_eq!(dst.get(0, 0, 0)?, 30);
    }
    Ok(())
}

#[test]
fn zero_raster_stays_zero() -> Result<(), FilterError> {
    let src = Raster::from_size_val([6, 4].into(), Channels::Rgb, 255, 0)?;
    for kind in FilterKind::ALL {
        for strategy in Strategy::ALL {
            let dst = filter(&src, kind.name(), 4, strategy)?;
            assert!(dst.as_slice().iter().all(|&v| v == 0));
        }
    }
    Ok(())
}

#[test]
fn reports_describe_the_partition() -> Result<(), FilterError> {
    init_logger();
    let src = Raster::from_size_val([7, 5].into(), Channels::Gray, 255, 128)?;

    for strategy in Strategy::ALL {
        for workers in 1..=6 {
            let (_, report) = filter_with_report(&src, "laplace", workers, strategy)?;
            assert_eq!(report.strategy(), strategy);
            verify_tiling(report.regions(), 7, 5)?;

            let expected = match strategy {
                Strategy::Sequential => 1,
                Strategy::ThreadQuadrant => 4,
                Strategy::TaskRowBand | Strategy::ProcessRowBand => workers,
            };
            assert_eq!(report.regions().len(), expected);
            assert_eq!(report.worker_timings().len(), expected);

            for (i, timing) in report.worker_timings().iter().enumerate() {
                assert_eq!(timing.worker, i);
                assert_eq!(timing.region, report.regions()[i]);
                assert!(timing.elapsed <= report.elapsed());
            }
        }
    }
    Ok(())
}

#[test]
fn more_workers_than_rows() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(3);
    let src = random_raster(&mut rng, 4, 2, Channels::Gray, 255)?;
    let reference = filter(&src, "sharpening", 1, Strategy::Sequential)?;

    for strategy in [Strategy::TaskRowBand, Strategy::ProcessRowBand] {
        let (dst, report) = filter_with_report(&src, "sharpening", 5, strategy)?;
        assert_eq!(dst, reference);
        assert_eq!(report.regions().iter().filter(|r| r.is_empty()).count(), 3);
    }
    Ok(())
}

#[test]
fn zero_workers_is_rejected() -> Result<(), FilterError> {
    let src = Raster::from_size_val([2, 2].into(), Channels::Gray, 255, 1)?;
    for strategy in [Strategy::TaskRowBand, Strategy::ProcessRowBand] {
        assert_eq!(
            filter(&src, "blur", 0, strategy),
            Err(FilterError::InvalidWorkerCount(0))
        );
    }
    Ok(())
}
