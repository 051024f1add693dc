//! Time geometry: pure functions from instants to grid units.
//!
//! Vertical positions are in minutes from the top of a page, horizontal
//! positions are column ordinals. The presentation layer multiplies both by
//! its own base sizes.

use crate::models::{Program, TimeWindow, MS_PER_MINUTE, MS_PER_SECOND};

/// Clamp a program to a window.
///
/// Returns `None` when nothing of the program remains inside the window.
pub fn clip_to_window(
    window_start: i64,
    window_end: i64,
    program_start: i64,
    program_end: i64,
) -> Option<(i64, i64)> {
    let clipped_start = program_start.max(window_start);
    let clipped_end = program_end.min(window_end);
    if clipped_end <= clipped_start {
        None
    } else {
        Some((clipped_start, clipped_end))
    }
}

/// Minutes from the window origin to a clipped start.
///
/// Any sub-minute remainder rounds up so a cell never overlaps the one above it.
pub fn top_offset_minutes(window_start: i64, clipped_start: i64) -> i64 {
    if clipped_start == window_start {
        return 0;
    }
    let seconds = (clipped_start - window_start).div_euclid(MS_PER_SECOND);
    ceil_div(seconds, 60)
}

/// Duration in whole minutes, rounded up.
pub fn duration_minutes(clipped_start: i64, clipped_end: i64) -> i64 {
    ceil_div(clipped_end - clipped_start, MS_PER_MINUTE)
}

/// Horizontal position of a column. The renderer applies the column width.
pub fn column_left(column_index: usize) -> usize {
    column_index
}

/// Geometry of one program within one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub top: i64,
    pub left: usize,
    pub height: i64,
}

/// Place a program in `column` relative to `window`.
///
/// Returns `None` for programs that are outside the window or clip to zero
/// minutes.
pub fn place(window: &TimeWindow, program: &Program, column: usize) -> Option<Placement> {
    let (start, end) = clip_to_window(window.start(), window.end(), program.start_at, program.end_at)?;
    let height = duration_minutes(start, end);
    if height <= 0 {
        return None;
    }
    Some(Placement {
        top: top_offset_minutes(window.start(), start),
        left: column_left(column),
        height,
    })
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    let q = value.div_euclid(divisor);
    if value.rem_euclid(divisor) == 0 {
        q
    } else {
        q + 1
    }
}
