//! Titlecard Text Layout
//!
//! Lays a string out as a centered block of lines on a fixed-size canvas:
//! - **Wrap:** greedy word-wrap against a pixel width using a font metric
//! - **Place:** per-line horizontal centering and block vertical centering
//!
//! This crate is pure computation with no I/O and no rendering. Glyph metrics come
//! in through the [`FontMetric`] trait so the same layout drives real fonts
//! and deterministic test metrics.

pub mod metric;
pub mod place;
pub mod wrap;

pub use metric::{FixedAdvanceMetric, FontMetric};
pub use place::{place, LinePlacement};
pub use wrap::wrap;

use serde::{Deserialize, Serialize};

/// Spacing and width rules for a text block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutStyle {
    /// Gap between the bottom of one line and the top of the next, in pixels.
    pub line_spacing: u32,

    /// Fraction of the canvas width a line may occupy.
    pub max_width_ratio: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            line_spacing: 40,
            max_width_ratio: 0.8,
        }
    }
}

impl LayoutStyle {
    /// Maximum line width in pixels for a canvas of the given width.
    pub fn max_line_width(&self, canvas_width: u32) -> u32 {
        (canvas_width as f64 * self.max_width_ratio as f64).floor() as u32
    }
}

/// Wrapped lines together with their placement on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub placements: Vec<LinePlacement>,
}

impl TextLayout {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate lines paired with their baseline origin.
    pub fn iter(&self) -> impl Iterator<Item = (&str, LinePlacement)> {
        self.lines
            .iter()
            .map(String::as_str)
            .zip(self.placements.iter().copied())
    }
}

/// Wrap `text` to the canvas and center the resulting block.
pub fn layout<M: FontMetric + ?Sized>(
    text: &str,
    canvas_width: u32,
    canvas_height: u32,
    style: &LayoutStyle,
    metric: &M,
) -> TextLayout {
    let lines = wrap(text, style.max_line_width(canvas_width), metric);
    let placements = place(
        &lines,
        canvas_width,
        canvas_height,
        style.line_spacing,
        metric,
    );
    TextLayout { lines, placements }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_line_width_uses_ratio() {
        let style = LayoutStyle::default();
        assert_eq!(style.max_line_width(1920), 1536);
        assert_eq!(style.max_line_width(0), 0);
    }

    #[test]
    fn test_layout_pairs_lines_with_placements() {
        let metric = FixedAdvanceMetric::new(8, 20);
        let style = LayoutStyle {
            line_spacing: 10,
            max_width_ratio: 0.5,
        };
        // max width 100px → 12 characters per line
        let layout = layout("the quick brown fox jumps", 200, 200, &style, &metric);
        assert_eq!(layout.lines, vec!["the quick", "brown fox", "jumps"]);
        assert_eq!(layout.placements.len(), 3);

        let pairs: Vec<_> = layout.iter().collect();
        assert_eq!(pairs[2].0, "jumps");
        assert_eq!(pairs[2].1, layout.placements[2]);
    }

    #[test]
    fn test_layout_of_blank_text_is_empty() {
        let metric = FixedAdvanceMetric::new(8, 20);
        let layout = layout("   \n\t ", 640, 360, &LayoutStyle::default(), &metric);
        assert!(layout.is_empty());
        assert!(layout.placements.is_empty());
    }

    #[test]
    fn test_lines_are_centered_on_their_visible_width() {
        let metric = FixedAdvanceMetric::new(8, 20);
        let style = LayoutStyle {
            line_spacing: 0,
            max_width_ratio: 1.0,
        };
        let layout = layout("Hello World", 200, 100, &style, &metric);
        assert_eq!(layout.lines, vec!["Hello World"]);
        // 11 glyphs * 8px = 88px; (200 - 88) / 2 = 56, no trailing space counted.
        assert_eq!(layout.placements[0].x, 56);
    }
}
