// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Maps iteration counts to colors.
//!
//! Colors are packed `0xRRGGBB` values.  The only policy implemented
//! here is a linear ramp from black to white over the iteration range;
//! the rest of the pipeline only ever sees the packed value, so a more
//! interesting palette can be dropped in here without touching it.

/// Black, and the background every frame starts with.
pub const BLACK: u32 = 0x00_0000;

/// The brightest color the ramp produces.
pub const WHITE: u32 = 0xFF_FFFF;

/// Scale `iters / max` linearly onto `[BLACK, WHITE]`, rounding down.
/// Points that never escaped (`iters == max`) come out white.
pub fn iteration_to_color(iters: u32, max: u32) -> u32 {
    debug_assert!(max > 0);
    debug_assert!(iters <= max);
    (u64::from(WHITE) * u64::from(iters) / u64::from(max)) as u32
}

/// Split a packed color into its red, green and blue channels.
#[inline]
pub fn to_rgb(color: u32) -> [u8; 3] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_endpoints() {
        for max in &[1, 3, 1000, 200_000] {
            assert_eq!(iteration_to_color(0, *max), BLACK);
            assert_eq!(iteration_to_color(*max, *max), WHITE);
        }
    }

    #[test]
    fn ramp_is_monotonic() {
        let max = 1000;
        let mut last = 0;
        for i in 0..=max {
            let c = iteration_to_color(i, max);
            assert!(c >= last);
            last = c;
        }
    }

    #[test]
    fn ramp_rounds_down() {
        // 0xFFFFFF / 2 = 8388607.5
        assert_eq!(iteration_to_color(1, 2), 0x7F_FFFF);
    }

    #[test]
    fn unpacks_channels() {
        assert_eq!(to_rgb(0x12_3456), [0x12, 0x34, 0x56]);
        assert_eq!(to_rgb(WHITE), [255, 255, 255]);
        assert_eq!(to_rgb(BLACK), [0, 0, 0]);
    }
}
