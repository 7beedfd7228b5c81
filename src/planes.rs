// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle of the complex plane (the Viewport) that the image
//! is a picture of.
use error::RenderError;
use num::Complex;

/// Describes the width and height of an integral plane that is assumed
/// to start at 0,0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y of a pixel in an image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// The rectangle of the complex plane mapped onto an image.  The real
/// part runs along x, the imaginary part along y.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Real coordinate of the left edge.
    pub xmin: f64,
    /// Real coordinate of the right edge.
    pub xmax: f64,
    /// Imaginary coordinate of the first row.
    pub ymin: f64,
    /// Imaginary coordinate one past the last row.
    pub ymax: f64,
}

impl Viewport {
    /// Builds the viewport centered on `center`, `xscale` wide, whose
    /// height keeps the pixels of a `width`x`height` image square.
    pub fn centered(center: Complex<f64>, xscale: f64, width: usize, height: usize) -> Viewport {
        let yscale = xscale / (width as f64) * (height as f64);
        Viewport {
            xmin: center.re - xscale / 2.0,
            xmax: center.re + xscale / 2.0,
            ymin: center.im - yscale / 2.0,
            ymax: center.im + yscale / 2.0,
        }
    }

    /// Width of the viewport along the real axis.
    pub fn xscale(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height of the viewport along the imaginary axis.
    pub fn yscale(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// Maps pixels of an image onto the points of the complex plane they
/// depict.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The size of the image.
    pub integral_plane: IntegralPlane,
    /// The region of the complex plane the image covers.
    pub viewport: Viewport,
}

impl PlaneMapper {
    /// Constructor.  Rejects empty images and viewports whose corners
    /// are not strictly ordered, since either would leave the mapping
    /// undefined.
    pub fn new(width: usize, height: usize, viewport: Viewport) -> Result<PlaneMapper, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::config(format!(
                "image size {}x{} has no pixels",
                width, height
            )));
        }

        if !(viewport.xmax > viewport.xmin) {
            return Err(RenderError::config(
                "the left edge of the viewport is not to the left of the right edge",
            ));
        }

        if !(viewport.ymax > viewport.ymin) {
            return Err(RenderError::config(
                "the top edge of the viewport is not above the bottom edge",
            ));
        }

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            viewport,
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// The total number of pixels in the image.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// True when the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Given a pixel on the integral plane, return the point of the
    /// complex plane its upper-left corner sits on.
    pub fn pixel_to_point(&self, pixel: Pixel) -> Complex<f64> {
        let v = &self.viewport;
        Complex::new(
            v.xmin + (pixel.0 as f64) * (v.xmax - v.xmin) / (self.width() as f64),
            v.ymin + (pixel.1 as f64) * (v.ymax - v.ymin) / (self.height() as f64),
        )
    }
}
