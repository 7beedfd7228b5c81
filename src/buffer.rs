// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The pixel buffer of a single frame, and the horizontal bands it can
//! be carved into so that several threads can fill it at once.
//!
//! A band is a mutable borrow of a contiguous run of rows.  Carving is
//! done with `split_at_mut()`, so two bands can never overlap and no
//! locking is needed while the workers write into them.

use error::RenderError;
use std::ops::Range;

/// A half-open range of rows, `[start, end)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RowRange {
    /// First row of the range.
    pub start: usize,
    /// One past the last row of the range.
    pub end: usize,
}

impl RowRange {
    /// Constructor.
    pub fn new(start: usize, end: usize) -> RowRange {
        debug_assert!(start <= end);
        RowRange { start, end }
    }

    /// Number of rows in the range.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the range holds no rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `row` falls inside the range.
    pub fn contains(&self, row: usize) -> bool {
        row >= self.start && row < self.end
    }

    /// The rows as an iterable range.
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A width x height grid of packed `0xRRGGBB` colors, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    /// Allocates a black buffer.  Fails rather than aborting when the
    /// pixel count overflows or the memory cannot be reserved.
    pub fn new(width: usize, height: usize) -> Result<FrameBuffer, RenderError> {
        let len = width
            .checked_mul(height)
            .ok_or(RenderError::Allocation(width, height))?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| RenderError::Allocation(width, height))?;
        pixels.resize(len, 0);
        Ok(FrameBuffer {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Paint every pixel with `color`.
    pub fn set_all(&mut self, color: u32) {
        for p in self.pixels.iter_mut() {
            *p = color;
        }
    }

    /// Set the pixel at column `x`, row `y`.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        assert!(x < self.width && y < self.height);
        self.pixels[y * self.width + x] = color;
    }

    /// The color at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    /// The whole buffer, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// The whole buffer as a band covering every row.
    pub fn as_band(&mut self) -> RowBand {
        RowBand {
            rows: RowRange::new(0, self.height),
            width: self.width,
            pixels: &mut self.pixels,
        }
    }

    /// Carve the buffer into one band per range.  The ranges must be
    /// contiguous, in order, and together cover every row exactly once.
    pub fn bands(&mut self, ranges: &[RowRange]) -> Vec<RowBand> {
        let width = self.width;
        let mut rest: &mut [u32] = &mut self.pixels;
        let mut next = 0;
        let mut bands = Vec::with_capacity(ranges.len());
        for range in ranges {
            assert_eq!(range.start, next, "row ranges must be contiguous");
            let (head, tail) = { rest }.split_at_mut(range.len() * width);
            bands.push(RowBand {
                rows: *range,
                width,
                pixels: head,
            });
            rest = tail;
            next = range.end;
        }
        assert_eq!(next, self.height, "row ranges must cover the frame");
        bands
    }
}

/// Exclusive access to a run of rows of a `FrameBuffer`.  Coordinates
/// are those of the whole frame, not of the band.
#[derive(Debug)]
pub struct RowBand<'a> {
    rows: RowRange,
    width: usize,
    pixels: &'a mut [u32],
}

impl<'a> RowBand<'a> {
    /// The rows this band may write.
    pub fn rows(&self) -> RowRange {
        self.rows
    }

    /// Width of the frame in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Set the pixel at column `x`, row `y` of the frame.  `y` must lie
    /// inside the band.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        assert!(self.rows.contains(y) && x < self.width);
        self.pixels[(y - self.rows.start) * self.width + x] = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffers_are_black() {
        let fb = FrameBuffer::new(3, 2).unwrap();
        assert_eq!(fb.pixels(), &[0u32; 6]);
    }

    #[test]
    fn overflowing_sizes_are_refused() {
        match FrameBuffer::new(usize::max_value(), 2) {
            Err(RenderError::Allocation(_, 2)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn set_all_then_set_pixel() {
        let mut fb = FrameBuffer::new(3, 2).unwrap();
        fb.set_all(7);
        fb.set_pixel(2, 1, 9);
        assert_eq!(fb.pixels(), &[7u32, 7, 7, 7, 7, 9]);
        assert_eq!(fb.pixel(2, 1), 9);
    }

    #[test]
    fn bands_write_into_their_own_rows() {
        let mut fb = FrameBuffer::new(2, 5).unwrap();
        {
            let ranges = [RowRange::new(0, 2), RowRange::new(2, 3), RowRange::new(3, 5)];
            let mut bands = fb.bands(&ranges);
            for band in bands.iter_mut() {
                for y in band.rows().rows() {
                    band.set_pixel(1, y, y as u32 + 1);
                }
            }
        }
        assert_eq!(fb.pixels(), &[0u32, 1, 0, 2, 0, 3, 0, 4, 0, 5]);
    }

    #[test]
    #[should_panic]
    fn bands_refuse_gaps() {
        let mut fb = FrameBuffer::new(2, 4).unwrap();
        fb.bands(&[RowRange::new(0, 1), RowRange::new(2, 4)]);
    }

    #[test]
    #[should_panic]
    fn band_refuses_rows_outside_itself() {
        let mut fb = FrameBuffer::new(2, 4).unwrap();
        let mut bands = fb.bands(&[RowRange::new(0, 2), RowRange::new(2, 4)]);
        bands[0].set_pixel(0, 2, 1);
    }

    #[test]
    fn row_range_basics() {
        let r = RowRange::new(3, 6);
        assert_eq!(r.len(), 3);
        assert!(r.contains(3) && r.contains(5) && !r.contains(6));
        assert!(RowRange::new(4, 4).is_empty());
    }
}
