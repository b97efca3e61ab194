//! Title-card canvas: a black frame with centered white text.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use titlecard_text_layout::{layout, LayoutStyle, TextLayout};

use crate::font::TitleFont;

/// Glyph color for the card text.
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// A `width` × `height` RGB canvas with every channel zeroed (black).
pub fn blank_canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::new(width, height)
}

/// Draw every line of `text_layout` onto `canvas`, in place.
///
/// Placement `y` values are baselines; imageproc positions glyphs from the
/// top of the line box, so the font ascent is subtracted. Glyph pixels that
/// fall outside the canvas are dropped.
pub fn draw_title_card(
    canvas: &mut RgbImage,
    text_layout: &TextLayout,
    font: &TitleFont,
    color: Rgb<u8>,
) {
    let ascent = font.ascent().round() as i32;
    for (line, origin) in text_layout.iter() {
        draw_text_mut(
            canvas,
            color,
            origin.x,
            origin.y - ascent,
            font.scale(),
            font.font(),
            line,
        );
    }
}

/// Lay out `text` for a `width` × `height` frame and render the card.
pub fn render_card(
    width: u32,
    height: u32,
    text: &str,
    style: &LayoutStyle,
    font: &TitleFont,
) -> (RgbImage, TextLayout) {
    let mut canvas = blank_canvas(width, height);
    let text_layout = layout(text, width, height, style, font);
    if !text_layout.is_empty() {
        draw_title_card(&mut canvas, &text_layout, font, TEXT_COLOR);
    }
    tracing::debug!(
        width,
        height,
        lines = text_layout.lines.len(),
        "Rendered title card"
    );
    (canvas, text_layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::test_font;

    fn lit_pixels(canvas: &RgbImage) -> Vec<(u32, u32)> {
        canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0.iter().any(|c| *c > 0))
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_blank_canvas_is_black() {
        let canvas = blank_canvas(16, 9);
        assert_eq!(canvas.dimensions(), (16, 9));
        assert!(canvas.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_blank_text_leaves_canvas_black() {
        let Some(font) = test_font() else {
            return;
        };
        let (canvas, text_layout) = render_card(320, 180, "   ", &LayoutStyle::default(), &font);
        assert!(text_layout.is_empty());
        assert!(lit_pixels(&canvas).is_empty());
    }

    #[test]
    fn test_text_is_drawn_near_the_center() {
        let Some(font) = test_font() else {
            return;
        };
        let (canvas, text_layout) =
            render_card(640, 360, "Hello World", &LayoutStyle::default(), &font);
        assert_eq!(text_layout.lines, vec!["Hello World"]);

        let lit = lit_pixels(&canvas);
        assert!(!lit.is_empty());

        let (min_x, max_x) = lit
            .iter()
            .fold((u32::MAX, 0), |(lo, hi), (x, _)| (lo.min(*x), hi.max(*x)));
        let (min_y, max_y) = lit
            .iter()
            .fold((u32::MAX, 0), |(lo, hi), (_, y)| (lo.min(*y), hi.max(*y)));

        // Ink stays in the middle of the frame and is roughly balanced around it.
        assert!(min_x > 100 && max_x < 540);
        assert!(min_y > 100 && max_y < 260);
        let center_x = (min_x + max_x) as i64 / 2;
        let center_y = (min_y + max_y) as i64 / 2;
        assert!((center_x - 320).abs() < 24, "center_x = {center_x}");
        assert!((center_y - 180).abs() < 24, "center_y = {center_y}");
    }

    #[test]
    fn test_long_text_wraps_into_multiple_lines() {
        let Some(font) = test_font() else {
            return;
        };
        let text = "this sentence is far too long to fit across a narrow frame";
        let (_, text_layout) = render_card(240, 480, text, &LayoutStyle::default(), &font);
        assert!(text_layout.lines.len() > 1);
        assert_eq!(text_layout.placements.len(), text_layout.lines.len());
    }

    #[test]
    fn test_oversized_text_is_clipped_not_panicking() {
        let Some(font) = test_font() else {
            return;
        };
        let (canvas, _) = render_card(8, 8, "Pneumonoultramicroscopic", &LayoutStyle::default(), &font);
        assert_eq!(canvas.dimensions(), (8, 8));
    }
}
