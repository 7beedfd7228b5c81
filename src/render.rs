// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Renders a single frame.
//!
//! A frame is cut into horizontal bands of rows, one band per worker
//! thread.  Every worker maps its pixels onto the complex plane, runs
//! the escape-time evaluator on each one and writes the resulting
//! color into its own band.  The bands are disjoint borrows of the
//! same buffer, so the workers never contend; the frame is done when
//! every worker has been joined.

extern crate crossbeam;

use buffer::{FrameBuffer, RowBand, RowRange};
use color::iteration_to_color;
use error::RenderError;
use escape::escape_time;
use itertools::iproduct;
use num::{clamp, Complex};
use planes::{Pixel, PlaneMapper};
use std::path::PathBuf;

/// The most row workers a single frame will be split across.
pub const MAX_ROW_WORKERS: usize = 20;

/// Everything needed to render and store one frame of the sequence.
/// Built by the driver before the frame is dispatched, and never
/// changed afterwards.
#[derive(Clone, Debug)]
pub struct FrameDescriptor {
    /// Position of the frame in the sequence.
    pub index: usize,
    /// The point the zoom is centered on.
    pub center: Complex<f64>,
    /// Width of the viewport along the real axis.
    pub xscale: f64,
    /// Image size and the viewport it depicts.
    pub plane: PlaneMapper,
    /// Iteration cap for every pixel of the frame.
    pub max_iterations: u32,
    /// Where the finished frame is persisted.
    pub output: PathBuf,
}

/// Bring a requested row worker count into `[1, MAX_ROW_WORKERS]`.
pub fn clamp_row_workers(requested: usize) -> usize {
    clamp(requested, 1, MAX_ROW_WORKERS)
}

/// Split `height` rows into `workers` contiguous ranges.  Every range
/// gets `height / workers` rows and the first `height % workers`
/// ranges get one more, so no two ranges differ by more than a row.
/// Ranges may be empty when there are more workers than rows.
pub fn partition_rows(height: usize, workers: usize) -> Vec<RowRange> {
    assert!(workers > 0, "cannot partition rows across zero workers");
    let base = height / workers;
    let extra = height % workers;
    let mut start = 0;
    (0..workers)
        .map(|i| {
            let len = if i < extra { base + 1 } else { base };
            let range = RowRange::new(start, start + len);
            start += len;
            range
        })
        .collect()
}

/// Compute every pixel of `band`: map it to the plane, count its
/// escape iterations and store the color.
pub fn render_rows(band: &mut RowBand, plane: &PlaneMapper, max_iterations: u32) {
    debug_assert_eq!(band.width(), plane.width());
    for (row, column) in iproduct!(band.rows().rows(), 0..plane.width()) {
        let point = plane.pixel_to_point(Pixel(column, row));
        let iters = escape_time(point, max_iterations);
        band.set_pixel(column, row, iteration_to_color(iters, max_iterations));
    }
}

/// Render `frame` into `buffer` using up to `row_workers` threads.
/// Returns only once every row has been written.  If any worker cannot
/// be started or dies, the frame as a whole fails.
pub fn render_frame(
    frame: &FrameDescriptor,
    buffer: &mut FrameBuffer,
    row_workers: usize,
) -> Result<(), RenderError> {
    let plane = frame.plane;
    let max = frame.max_iterations;
    assert_eq!(
        (buffer.width(), buffer.height()),
        (plane.width(), plane.height()),
        "buffer does not match the frame"
    );

    let workers = clamp_row_workers(row_workers);
    if workers == 1 {
        render_rows(&mut buffer.as_band(), &plane, max);
        return Ok(());
    }

    let ranges = partition_rows(plane.height(), workers);
    let bands = buffer.bands(&ranges);
    let index = frame.index;

    crossbeam::scope(|spawner| -> Result<(), RenderError> {
        let mut handles = Vec::with_capacity(bands.len());
        for mut band in bands {
            let rows = band.rows();
            let name = format!("frame {} rows {}..{}", index, rows.start, rows.end);
            debug!("spawning {}", name);
            let handle = spawner
                .builder()
                .name(name.clone())
                .spawn(move |_| render_rows(&mut band, &plane, max))
                .map_err(|e| RenderError::Spawn(name.clone(), e))?;
            handles.push((name, handle));
        }
        for (name, handle) in handles {
            handle
                .join()
                .map_err(|_| RenderError::WorkerPanicked(name.clone()))?;
            debug!("joined {}", name);
        }
        Ok(())
    })
    .map_err(|_| RenderError::WorkerPanicked(format!("a row worker of frame {}", index)))?
}
