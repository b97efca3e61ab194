//! Centered placement of wrapped lines.

use crate::metric::FontMetric;

/// Origin of one line of text: `x` is the left edge, `y` the baseline.
///
/// Coordinates may be negative when the text does not fit the canvas; they
/// are never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinePlacement {
    pub x: i32,
    pub y: i32,
}

/// Total height of a block of `line_count` lines.
pub fn block_height(line_count: usize, text_height: u32, line_spacing: u32) -> i64 {
    if line_count == 0 {
        return 0;
    }
    let n = line_count as i64;
    n * text_height as i64 + (n - 1) * line_spacing as i64
}

/// Compute the origin of each line so the block is vertically centered and
/// every line is horizontally centered on its own.
///
/// Lines of different lengths are not aligned to each other. The result has
/// exactly one entry per input line; an empty input yields an empty plan.
///
/// Widths are measured on the lines exactly as [`crate::wrap`] emits them,
/// with no trailing space, so centering uses the visible ink width.
pub fn place<M: FontMetric + ?Sized>(
    lines: &[String],
    canvas_width: u32,
    canvas_height: u32,
    line_spacing: u32,
    metric: &M,
) -> Vec<LinePlacement> {
    if lines.is_empty() {
        return Vec::new();
    }

    let text_height = metric.text_height() as i64;
    let total = block_height(lines.len(), metric.text_height(), line_spacing);
    let y_start = (canvas_height as i64 - total).div_euclid(2) + text_height;
    let stride = text_height + line_spacing as i64;

    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let width = metric.text_width(line) as i64;
            LinePlacement {
                x: saturate((canvas_width as i64 - width).div_euclid(2)),
                y: saturate(y_start + idx as i64 * stride),
            }
        })
        .collect()
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
