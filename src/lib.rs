#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot zoom renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which repeatedly squaring `z` and adding `c` never sends `z`
//! off to infinity.  The classic picture colors every pixel by how
//! many iterations its point took to leave the disk of radius 2, the
//! "escape time"; points that never leave are in the set.
//!
//! This crate renders a sequence of such pictures, each one a little
//! closer in on the same center point than the last, so that the
//! frames can be stitched together into a zoom animation.  There are
//! two levels of parallelism: several frames can be rendered at once,
//! and each frame can be split into bands of rows rendered by their
//! own threads.
//!
//! ```no_run
//! use mandelzoom::{JpegSink, RenderConfig, SequenceDriver};
//!
//! let config = RenderConfig {
//!     xcenter: -0.38,
//!     ycenter: -0.665,
//!     xscale: 0.05,
//!     row_concurrency: 4,
//!     ..RenderConfig::default()
//! };
//! let driver = SequenceDriver::new(config, JpegSink::default()).unwrap();
//! driver.run().unwrap();
//! ```

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod buffer;
pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod escape;
pub mod planes;
pub mod render;
pub mod sink;

pub use buffer::{FrameBuffer, RowBand, RowRange};
pub use config::RenderConfig;
pub use driver::{RunSummary, SequenceDriver};
pub use error::RenderError;
pub use escape::escape_time;
pub use planes::{PlaneMapper, Viewport};
pub use render::{render_frame, FrameDescriptor};
pub use sink::{ImageSink, JpegSink, MemorySink};
