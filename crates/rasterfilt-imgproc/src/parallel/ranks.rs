//! Row band execution over isolated ranks.
//!
//! Ranks follow a scatter/gather protocol: the coordinator broadcasts the
//! whole input as an encoded message, every rank decodes its own copy,
//! filters the band matching its rank and replies with an encoded partial
//! buffer. The coordinator places each partial at
//! `row_start * row_stride` in the output. Nothing but bytes crosses the
//! boundary between a rank and the coordinator.

use std::{sync::mpsc, time::Duration};

use rasterfilt_image::{Channels, Raster};

use super::{alloc_samples, panic_message};
use crate::{
    diagnostics::{as_millis_f64, Stopwatch, WorkerTiming},
    error::FilterError,
    filter::{convolution::convolve_region, kernels::Kernel},
    partition::{row_bands, Region},
};

/// The input sent to every rank.
#[derive(Debug, Clone, PartialEq, bincode::Encode, bincode::Decode)]
struct Broadcast {
    world_size: usize,
    width: usize,
    height: usize,
    channels: usize,
    max_sample: i32,
    weights: [[f32; 3]; 3],
    samples: Vec<i32>,
}

/// The filtered band sent back by one rank.
#[derive(Debug, Clone, PartialEq, bincode::Encode, bincode::Decode)]
struct Partial {
    rank: usize,
    row_start: usize,
    row_end: usize,
    elapsed_nanos: u64,
    samples: Vec<i32>,
}

fn transfer_error(e: impl std::fmt::Display) -> FilterError {
    FilterError::Transfer(e.to_string())
}

fn copy_message(bytes: &[u8]) -> Result<Vec<u8>, FilterError> {
    let mut message = Vec::new();
    message
        .try_reserve_exact(bytes.len())
        .map_err(|_| FilterError::AllocationFailure(bytes.len()))?;
    message.extend_from_slice(bytes);
    Ok(message)
}

/// Run one rank per region and gather the bands into a fresh buffer.
///
/// `regions` must be the row bands of the input for `regions.len()` ranks.
pub(super) fn run_ranks(
    src: &Raster,
    kernel: &Kernel,
    regions: &[Region],
) -> Result<(Vec<i32>, Vec<WorkerTiming>), FilterError> {
    let world_size = regions.len();
    let config = bincode::config::standard();

    let broadcast = Broadcast {
        world_size,
        width: src.width(),
        height: src.height(),
        channels: src.num_channels(),
        max_sample: src.max_sample(),
        weights: *kernel.weights(),
        samples: src.as_slice().to_vec(),
    };
    let encoded = bincode::encode_to_vec(&broadcast, config).map_err(transfer_error)?;
    log::debug!(
        "broadcasting {} bytes to {world_size} rank(s)",
        encoded.len()
    );

    let messages = (0..world_size)
        .map(|_| copy_message(&encoded))
        .collect::<Result<Vec<_>, _>>()?;
    drop(encoded);

    let stride = src.row_stride();
    let mut output = alloc_samples(src.as_slice().len())?;
    let mut received = vec![false; world_size];

    let (gathered, gather_error, joined) = std::thread::scope(|s| {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();

        let handles = messages
            .into_iter()
            .enumerate()
            .map(|(rank, message)| {
                let tx = tx.clone();
                std::thread::Builder::new()
                    .name(format!("rank-{rank}"))
                    .spawn_scoped(s, move || -> Result<(), FilterError> {
                        let reply = rank_main(rank, &message)?;
                        tx.send(reply).map_err(|_| {
                            FilterError::Transfer(format!("rank {rank} lost the coordinator"))
                        })
                    })
                    .map_err(|e| FilterError::WorkerFailure {
                        worker: rank,
                        reason: e.to_string(),
                    })
            })
            .collect::<Vec<_>>();
        drop(tx);

        let mut gathered = Vec::with_capacity(world_size);
        let mut gather_error = None;
        for reply in rx {
            match gather_partial(&mut output, regions, stride, &mut received, &reply) {
                Ok(timing) => gathered.push(timing),
                Err(e) => {
                    gather_error.get_or_insert(e);
                }
            }
        }

        let joined = handles
            .into_iter()
            .enumerate()
            .map(|(rank, handle)| match handle?.join() {
                Ok(res) => res.map_err(|e| FilterError::WorkerFailure {
                    worker: rank,
                    reason: e.to_string(),
                }),
                Err(payload) => Err(FilterError::WorkerFailure {
                    worker: rank,
                    reason: panic_message(payload.as_ref()),
                }),
            })
            .collect::<Vec<_>>();

        (gathered, gather_error, joined)
    });

    joined.into_iter().collect::<Result<Vec<_>, _>>()?;
    if let Some(e) = gather_error {
        return Err(e);
    }
    if let Some(rank) = received.iter().position(|&r| !r) {
        return Err(FilterError::Transfer(format!("rank {rank} sent no result")));
    }

    Ok((output, gathered))
}

/// The body of one rank: decode the broadcast, filter the own band, reply.
fn rank_main(rank: usize, message: &[u8]) -> Result<Vec<u8>, FilterError> {
    let config = bincode::config::standard();
    let (broadcast, _): (Broadcast, usize) =
        bincode::decode_from_slice(message, config).map_err(transfer_error)?;

    let Broadcast {
        world_size,
        width,
        height,
        channels,
        max_sample,
        weights,
        samples,
    } = broadcast;

    let src = Raster::new(
        [width, height].into(),
        Channels::try_from(channels)?,
        max_sample,
        samples,
    )?;
    let kernel = Kernel::new(weights);
    let region = row_bands(width, height, world_size)?
        .get(rank)
        .copied()
        .ok_or_else(|| {
            FilterError::Transfer(format!("rank {rank} is outside a world of {world_size}"))
        })?;
    log::debug!("rank {rank} processing {region}");

    let mut watch = Stopwatch::start();
    let mut band = alloc_samples(region.rows() * src.row_stride())?;
    {
        let mut rows = band.chunks_exact_mut(src.row_stride()).collect::<Vec<_>>();
        convolve_region(&src, &kernel, &region, &mut rows);
    }
    let elapsed = watch.stop();
    log::debug!("rank {rank} done in {:.3} ms", as_millis_f64(elapsed));

    let partial = Partial {
        rank,
        row_start: region.row_start,
        row_end: region.row_end,
        elapsed_nanos: elapsed.as_nanos() as u64,
        samples: band,
    };
    bincode::encode_to_vec(&partial, config).map_err(transfer_error)
}

/// Place one encoded partial into the output.
///
/// The partial must come from a known rank, arrive once, describe the band
/// the coordinator expects for that rank and carry exactly
/// `rows * row_stride` samples.
fn gather_partial(
    output: &mut [i32],
    regions: &[Region],
    stride: usize,
    received: &mut [bool],
    reply: &[u8],
) -> Result<WorkerTiming, FilterError> {
    let (partial, _): (Partial, usize) =
        bincode::decode_from_slice(reply, bincode::config::standard()).map_err(transfer_error)?;

    let rank = partial.rank;
    let region = *regions
        .get(rank)
        .ok_or_else(|| FilterError::Transfer(format!("reply from unknown rank {rank}")))?;
    if received[rank] {
        return Err(FilterError::Transfer(format!(
            "rank {rank} replied twice"
        )));
    }
    if (partial.row_start, partial.row_end) != (region.row_start, region.row_end) {
        return Err(FilterError::Transfer(format!(
            "rank {rank} sent rows {}..{}, expected {}..{}",
            partial.row_start, partial.row_end, region.row_start, region.row_end
        )));
    }

    let count = region.rows() * stride;
    let displ = region.row_start * stride;
    if partial.samples.len() != count || displ + count > output.len() {
        return Err(FilterError::Transfer(format!(
            "rank {rank} sent {} samples, expected {count}",
            partial.samples.len()
        )));
    }

    output[displ..displ + count].copy_from_slice(&partial.samples);
    received[rank] = true;

    Ok(WorkerTiming {
        worker: rank,
        region,
        elapsed: Duration::from_nanos(partial.elapsed_nanos),
    })
}
