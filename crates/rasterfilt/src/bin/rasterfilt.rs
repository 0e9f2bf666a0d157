use argh::FromArgs;
use std::path::{Path, PathBuf};

use rasterfilt::image::Raster;
use rasterfilt::imgproc::{
    diagnostics::{as_millis_f64, FilterReport, Stopwatch},
    filter::{filter_all, filter_with_kernel, kernels::FilterKind},
    parallel::{FilterOptions, Strategy},
};
use rasterfilt::io::{decode_pnm, detect_format, write_image_pnm, IoError};

#[derive(FromArgs)]
/// Apply a 3x3 filter to a plain PGM/PPM image
struct Args {
    /// path to the input image
    #[argh(positional)]
    input: PathBuf,

    /// path to the output image, defaults to `<stem>_<filter>.<ext>`
    #[argh(positional)]
    output: Option<PathBuf>,

    /// filter to apply: blur, laplace or sharpening
    #[argh(option, short = 'f', default = "String::from(\"blur\")")]
    filter: String,

    /// execution strategy: sequential, thread-quadrant, task-rowband or process-rowband
    #[argh(option, short = 's', default = "Strategy::default()")]
    strategy: Strategy,

    /// number of workers for the row band strategies
    #[argh(option, short = 'w')]
    workers: Option<usize>,

    /// apply every filter and write one output per filter
    #[argh(switch, short = 'a')]
    all: bool,
}

/// Output path for `filter` next to `input`: `<stem>_<filter>.<ext>`.
fn output_path(input: &Path, filter: FilterKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_{filter}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{filter}"),
    };
    input.with_file_name(name)
}

fn print_report(kind: FilterKind, report: &FilterReport) {
    println!(
        "{kind}: {} in {:.3} ms",
        report.strategy(),
        as_millis_f64(report.elapsed())
    );
    for timing in report.worker_timings() {
        println!(
            "  worker {} [{}]: {:.3} ms",
            timing.worker,
            timing.region,
            as_millis_f64(timing.elapsed)
        );
    }
}

fn save(path: &Path, raster: &Raster) -> Result<(), IoError> {
    let mut watch = Stopwatch::start();
    write_image_pnm(path, raster)?;
    println!(
        "saved {} in {:.3} ms",
        path.display(),
        as_millis_f64(watch.stop())
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    let options = match args.workers {
        Some(workers) => FilterOptions::new(args.strategy, workers),
        None => FilterOptions {
            strategy: args.strategy,
            ..Default::default()
        },
    };

    // load
    let mut watch = Stopwatch::start();
    if !args.input.exists() {
        return Err(IoError::FileDoesNotExist(args.input.clone()).into());
    }
    let bytes = std::fs::read(&args.input)?;
    let format = detect_format(&bytes)?;
    let src = decode_pnm(&bytes)?;
    let load = watch.stop();

    log::info!("detected {} ({:?})", format.magic(), format);
    println!(
        "loaded {} ({}, max {}) in {:.3} ms",
        args.input.display(),
        src.size(),
        src.max_sample(),
        as_millis_f64(load)
    );

    if args.all {
        let outputs = filter_all(&src, &options)?;
        for output in &outputs {
            print_report(output.kind, &output.report);
            save(&output_path(&args.input, output.kind), &output.raster)?;
        }
        return Ok(());
    }

    let kind = FilterKind::from_name(&args.filter);
    if kind.name() != args.filter && args.filter != "sharpen" {
        log::warn!("unknown filter '{}', using {kind}", args.filter);
    }

    let (dst, report) = filter_with_kernel(&src, &kind.kernel(), &options)?;
    print_report(kind, &report);

    let output = args
        .output
        .unwrap_or_else(|| output_path(&args.input, kind));
    save(&output, &dst)?;

    Ok(())
}
