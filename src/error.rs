// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can go wrong during a run.  None of these are
//! recoverable: the first one ends the run.

use failure::Fail;
use std::io;

/// Errors raised while configuring or rendering a zoom sequence.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// A configuration value would produce a degenerate image.
    #[fail(display = "invalid configuration: {}", _0)]
    InvalidConfig(String),

    /// The pixel buffer for a frame could not be allocated.
    #[fail(display = "could not allocate a {}x{} pixel buffer", _0, _1)]
    Allocation(usize, usize),

    /// The operating system refused to start a worker thread.
    #[fail(display = "could not spawn {}: {}", _0, _1)]
    Spawn(String, #[cause] io::Error),

    /// A worker thread panicked before finishing its share.
    #[fail(display = "{} panicked", _0)]
    WorkerPanicked(String),

    /// The image sink could not store a finished frame.
    #[fail(display = "could not write {}: {}", path, reason)]
    Persist {
        /// Where the frame was supposed to go.
        path: String,
        /// What the sink reported.
        reason: String,
    },
}

impl RenderError {
    /// Shorthand for a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        RenderError::InvalidConfig(msg.into())
    }
}
