//! Rounding and centering shared by the compositors.

use crate::canvas::Canvas;

/// Rounds to the nearest integer, sending exact halves to the even
/// neighbour. Every pixel offset in the layout goes through this so
/// `x.5` positions land the same way everywhere.
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

pub fn center_offset(outer: u32, inner: u32) -> i32 {
    round_half_even((outer as f64 - inner as f64) / 2.0) as i32
}

/// Offset that centres `inner` on an `outer_width` x `outer_height` area.
/// Empty content is anchored at the origin.
pub fn center_in(outer_width: u32, outer_height: u32, inner: &Canvas) -> (i32, i32) {
    if inner.is_empty() {
        return (0, 0);
    }
    (
        center_offset(outer_width, inner.width()),
        center_offset(outer_height, inner.height()),
    )
}
