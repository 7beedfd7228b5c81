// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The SequenceDriver turns a configuration into a zoom: it works out
//! the viewport of every frame, then hands the frames to a small pool
//! of frame workers that render and persist them.
//!
//! The viewports are all planned up front, in frame order, before any
//! worker starts.  The scale of frame `i` is therefore the initial
//! scale times `decay^i` no matter how many workers there are or in
//! what order they finish.
//!
//! A run is all-or-nothing.  The first frame that fails stops the
//! workers from taking new frames; frames already in flight are
//! finished, frames already written stay on disk, and the error is
//! handed back to the caller.

extern crate crossbeam;

use color::BLACK;
use config::RenderConfig;
use error::RenderError;
use planes::{PlaneMapper, Viewport};
use render::{render_frame, FrameDescriptor};
use sink::ImageSink;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::vec;

type FrameQueue = Arc<Mutex<vec::IntoIter<FrameDescriptor>>>;

/// What a finished run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Output of every frame, in frame order.
    pub frames: Vec<PathBuf>,
}

/// Renders a whole zoom sequence into an `ImageSink`.
pub struct SequenceDriver<S: ImageSink> {
    config: RenderConfig,
    sink: S,
}

impl<S: ImageSink> SequenceDriver<S> {
    /// Checks the configuration and takes ownership of the sink.
    pub fn new(config: RenderConfig, sink: S) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(SequenceDriver { config, sink })
    }

    /// The configuration this driver runs with.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Give the sink back, with whatever was persisted into it.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// The descriptor of every frame, in order.  Each frame zooms in on
    /// the center by the decay factor relative to the previous one.
    pub fn plan(&self) -> Result<Vec<FrameDescriptor>, RenderError> {
        let c = &self.config;
        let center = c.center();
        let mut xscale = c.xscale;
        let mut frames = Vec::with_capacity(c.frame_count);
        for index in 0..c.frame_count {
            let viewport = Viewport::centered(center, xscale, c.image_width, c.image_height);
            let plane = PlaneMapper::new(c.image_width, c.image_height, viewport).map_err(|e| {
                RenderError::config(format!(
                    "frame {} (scale {:e}) is past the precision of f64: {}",
                    index, xscale, e
                ))
            })?;
            frames.push(FrameDescriptor {
                index,
                center,
                xscale,
                plane,
                max_iterations: c.max_iterations,
                output: c.frame_path(index),
            });
            xscale *= c.scale_decay;
        }
        Ok(frames)
    }

    /// Render and persist every frame.  Returns once all dispatched
    /// frames are done, or with the first error any of them hit.
    pub fn run(&self) -> Result<RunSummary, RenderError> {
        let frames = self.plan()?;
        let frame_workers = self.config.frame_workers();
        let row_workers = self.config.row_workers();

        if frame_workers != self.config.frame_concurrency {
            warn!(
                "frame concurrency {} clamped to {}",
                self.config.frame_concurrency, frame_workers
            );
        }
        if row_workers != self.config.row_concurrency {
            warn!(
                "row concurrency {} clamped to {}",
                self.config.row_concurrency, row_workers
            );
        }
        if let Some(ref outfile) = self.config.outfile {
            warn!(
                "ignoring output file {}: every frame is named mandel<N>.jpg",
                outfile
            );
        }
        self.dispatch(frames, frame_workers, row_workers)
    }

    /// Hand `frames` to `frame_workers` workers and wait for all of
    /// them.  The worker count is taken as given.
    fn dispatch(
        &self,
        frames: Vec<FrameDescriptor>,
        frame_workers: usize,
        row_workers: usize,
    ) -> Result<RunSummary, RenderError> {
        info!(
            "rendering {} frames of {}x{}, {} at a time with {} row workers each",
            frames.len(),
            self.config.image_width,
            self.config.image_height,
            frame_workers,
            row_workers
        );

        let queue: FrameQueue = Arc::new(Mutex::new(frames.into_iter()));
        let failed = AtomicBool::new(false);
        let sink = &self.sink;

        let outcome = crossbeam::scope(|spawner| -> Result<Vec<(usize, PathBuf)>, RenderError> {
            let mut first_error = None;
            let mut handles = Vec::with_capacity(frame_workers);
            for worker in 0..frame_workers {
                let queue = queue.clone();
                let failed = &failed;
                let name = format!("frame worker {}", worker);
                let spawned = spawner
                    .builder()
                    .name(name.clone())
                    .spawn(move |_| frame_worker(sink, &queue, failed, row_workers));
                match spawned {
                    Ok(handle) => handles.push((name, handle)),
                    Err(e) => {
                        error!("could not spawn {}: {}", name, e);
                        failed.store(true, Ordering::SeqCst);
                        first_error = Some(RenderError::Spawn(name, e));
                        break;
                    }
                }
            }

            let mut finished = Vec::new();
            for (name, handle) in handles {
                match handle.join() {
                    Ok(Ok(done)) => finished.extend(done),
                    Ok(Err(e)) => {
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                    Err(_) => {
                        failed.store(true, Ordering::SeqCst);
                        if first_error.is_none() {
                            first_error = Some(RenderError::WorkerPanicked(name));
                        }
                    }
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(finished),
            }
        });
        let mut finished = outcome
            .map_err(|_| RenderError::WorkerPanicked("a frame worker".to_string()))??;

        finished.sort_by_key(|&(index, _)| index);
        Ok(RunSummary {
            frames: finished.into_iter().map(|(_, path)| path).collect(),
        })
    }
}

/// Pull frames off the queue until it is empty or some frame failed.
/// Returns the index and output of every frame this worker finished.
fn frame_worker<S: ImageSink>(
    sink: &S,
    queue: &FrameQueue,
    failed: &AtomicBool,
    row_workers: usize,
) -> Result<Vec<(usize, PathBuf)>, RenderError> {
    let mut done = Vec::new();
    while !failed.load(Ordering::SeqCst) {
        let frame = match queue.lock() {
            Ok(mut frames) => frames.next(),
            Err(_) => {
                failed.store(true, Ordering::SeqCst);
                return Err(RenderError::WorkerPanicked("the frame queue".to_string()));
            }
        };
        let frame = match frame {
            Some(frame) => frame,
            None => break,
        };
        match render_and_persist(sink, &frame, row_workers) {
            Ok(()) => done.push((frame.index, frame.output)),
            Err(e) => {
                error!("frame {} aborted: {}", frame.index, e);
                failed.store(true, Ordering::SeqCst);
                return Err(e);
            }
        }
    }
    Ok(done)
}

/// One frame, start to finish: allocate, clear, render, persist, release.
fn render_and_persist<S: ImageSink>(
    sink: &S,
    frame: &FrameDescriptor,
    row_workers: usize,
) -> Result<(), RenderError> {
    let plane = &frame.plane;
    info!(
        "mandel: x={} y={} xscale={} yscale={} max={} outfile={}",
        frame.center.re,
        frame.center.im,
        frame.xscale,
        plane.viewport.yscale(),
        frame.max_iterations,
        frame.output.display()
    );

    let mut buffer = sink.allocate(plane.width(), plane.height())?;
    buffer.set_all(BLACK);
    render_frame(frame, &mut buffer, row_workers)?;
    sink.persist(&buffer, &frame.output)?;
    sink.release(buffer);
    debug!("frame {} persisted", frame.index);
    Ok(())
}
