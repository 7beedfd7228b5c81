// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The knobs of a run.  Built once, checked once, and then only ever
//! read.

use error::RenderError;
use num::{clamp, Complex};
use num_cpus;
use render::clamp_row_workers;
use sink::MAX_JPEG_SIDE;
use std::path::PathBuf;

/// Frames rendered when nobody asks for a different number.
pub const DEFAULT_FRAMES: usize = 50;

/// Each frame is this much as wide as the one before it.
pub const DEFAULT_SCALE_DECAY: f64 = 0.90;

/// Parameters of a zoom sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Real coordinate the zoom closes in on.
    pub xcenter: f64,
    /// Imaginary coordinate the zoom closes in on.
    pub ycenter: f64,
    /// Width of the first frame's viewport along the real axis.
    pub xscale: f64,
    /// Image width in pixels.
    pub image_width: usize,
    /// Image height in pixels.
    pub image_height: usize,
    /// Iteration cap per pixel.
    pub max_iterations: u32,
    /// Number of frames in the sequence.
    pub frame_count: usize,
    /// Frames rendered at the same time.
    pub frame_concurrency: usize,
    /// Row workers per frame.
    pub row_concurrency: usize,
    /// Factor applied to `xscale` from one frame to the next.
    pub scale_decay: f64,
    /// Directory the frames are written to.
    pub output_dir: PathBuf,
    /// A single output file name.  Accepted for compatibility, but
    /// every frame is named after its index regardless.
    pub outfile: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            xcenter: 0.0,
            ycenter: 0.0,
            xscale: 4.0,
            image_width: 1000,
            image_height: 1000,
            max_iterations: 1000,
            frame_count: DEFAULT_FRAMES,
            frame_concurrency: 1,
            row_concurrency: 1,
            scale_decay: DEFAULT_SCALE_DECAY,
            output_dir: PathBuf::from("."),
            outfile: None,
        }
    }
}

impl RenderConfig {
    /// The point every frame is centered on.
    pub fn center(&self) -> Complex<f64> {
        Complex::new(self.xcenter, self.ycenter)
    }

    /// Frames rendered at once, between 1 and the number of CPUs.
    pub fn frame_workers(&self) -> usize {
        clamp(self.frame_concurrency, 1, num_cpus::get().max(1))
    }

    /// Row workers per frame, between 1 and `MAX_ROW_WORKERS`.
    pub fn row_workers(&self) -> usize {
        clamp_row_workers(self.row_concurrency)
    }

    /// Where frame `index` is stored.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("mandel{}.jpg", index))
    }

    /// Reject values that would make the images degenerate.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(RenderError::config(format!(
                "image size {}x{} has no pixels",
                self.image_width, self.image_height
            )));
        }
        if self.image_width > MAX_JPEG_SIDE || self.image_height > MAX_JPEG_SIDE {
            return Err(RenderError::config(format!(
                "image size {}x{} is too large: frames are JPEGs, at most {} pixels per side",
                self.image_width, self.image_height, MAX_JPEG_SIDE
            )));
        }
        if self.image_width.checked_mul(self.image_height).is_none() {
            return Err(RenderError::config(format!(
                "image size {}x{} is too large",
                self.image_width, self.image_height
            )));
        }
        if self.max_iterations == 0 {
            return Err(RenderError::config("max iterations must be at least 1"));
        }
        if self.frame_count == 0 {
            return Err(RenderError::config("frame count must be at least 1"));
        }
        if !self.xcenter.is_finite() || !self.ycenter.is_finite() {
            return Err(RenderError::config(format!(
                "center {},{} is not a finite point",
                self.xcenter, self.ycenter
            )));
        }
        if !(self.xscale.is_finite() && self.xscale > 0.0) {
            return Err(RenderError::config(format!(
                "scale {} must be a positive number",
                self.xscale
            )));
        }
        if !(self.scale_decay.is_finite() && self.scale_decay > 0.0 && self.scale_decay <= 1.0) {
            return Err(RenderError::config(format!(
                "scale decay {} must be in (0, 1]",
                self.scale_decay
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use render::MAX_ROW_WORKERS;
    use std::f64;

    #[test]
    fn defaults_match_the_classic_tool() {
        let c = RenderConfig::default();
        assert_eq!((c.xcenter, c.ycenter, c.xscale), (0.0, 0.0, 4.0));
        assert_eq!((c.image_width, c.image_height), (1000, 1000));
        assert_eq!(c.max_iterations, 1000);
        assert_eq!(c.frame_count, 50);
        assert_eq!((c.frame_concurrency, c.row_concurrency), (1, 1));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn frames_are_named_by_index() {
        let c = RenderConfig {
            output_dir: PathBuf::from("out"),
            outfile: Some("ignored.jpg".to_string()),
            ..RenderConfig::default()
        };
        assert_eq!(c.frame_path(7), PathBuf::from("out").join("mandel7.jpg"));
    }

    #[test]
    fn concurrency_is_clamped() {
        let c = RenderConfig {
            frame_concurrency: 0,
            row_concurrency: 99,
            ..RenderConfig::default()
        };
        assert_eq!(c.frame_workers(), 1);
        assert_eq!(c.row_workers(), MAX_ROW_WORKERS);

        let c = RenderConfig {
            frame_concurrency: 100_000,
            ..RenderConfig::default()
        };
        assert_eq!(c.frame_workers(), num_cpus::get());
    }

    #[test]
    fn sides_past_the_jpeg_limit_are_refused() {
        let wide = RenderConfig {
            image_width: MAX_JPEG_SIDE + 1,
            ..RenderConfig::default()
        };
        match wide.validate() {
            Err(RenderError::InvalidConfig(msg)) => assert!(msg.contains("65535")),
            other => panic!("unexpected {:?}", other),
        }
        let tall = RenderConfig {
            image_height: 100_000,
            ..RenderConfig::default()
        };
        assert!(tall.validate().is_err());
        let largest = RenderConfig {
            image_width: MAX_JPEG_SIDE,
            image_height: MAX_JPEG_SIDE,
            ..RenderConfig::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn degenerate_values_are_refused() {
        let bad = vec![
            RenderConfig { image_width: 0, ..RenderConfig::default() },
            RenderConfig { image_height: 0, ..RenderConfig::default() },
            RenderConfig { max_iterations: 0, ..RenderConfig::default() },
            RenderConfig { frame_count: 0, ..RenderConfig::default() },
            RenderConfig { xscale: 0.0, ..RenderConfig::default() },
            RenderConfig { xscale: -1.0, ..RenderConfig::default() },
            RenderConfig { xscale: f64::NAN, ..RenderConfig::default() },
            RenderConfig { xcenter: f64::INFINITY, ..RenderConfig::default() },
            RenderConfig { scale_decay: 1.5, ..RenderConfig::default() },
            RenderConfig { scale_decay: 0.0, ..RenderConfig::default() },
            RenderConfig {
                image_width: usize::max_value(),
                image_height: 2,
                ..RenderConfig::default()
            },
        ];
        for c in bad {
            match c.validate() {
                Err(RenderError::InvalidConfig(_)) => {}
                other => panic!("{:?} gave {:?}", c, other),
            }
        }
    }
}
