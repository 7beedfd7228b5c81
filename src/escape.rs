// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.  Every pixel in a frame ends up here,
//! so this is the hot loop of the whole renderer.

use num::Complex;

/// Iterate `z = z * z + c`, starting with `z = c`, and count the
/// iterations it takes for `z` to leave the disk of radius 2.  The
/// count is capped at `max`; a result of `max` means the point did
/// not escape within the budget and is presumed to be inside the
/// Mandelbrot set.  A point that starts outside the disk returns 0.
///
/// The squares are spelled out by hand rather than using
/// `Complex::norm_sqr()` on `z * z`, so that we only compute them
/// once per step.
pub fn escape_time(c: Complex<f64>, max: u32) -> u32 {
    let (x0, y0) = (c.re, c.im);
    let (mut x, mut y) = (x0, y0);
    let mut iter = 0;
    while x * x + y * y <= 4.0 && iter < max {
        let xt = x * x - y * y + x0;
        y = 2.0 * x * y + y0;
        x = xt;
        iter += 1;
    }
    iter
}
