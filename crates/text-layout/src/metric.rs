//! Font metrics consumed by the layout.

/// Measures rendered text in pixels.
pub trait FontMetric {
    /// Rendered width of `text` on a single line.
    fn text_width(&self, text: &str) -> u32;

    /// Height of a single rendered line (cap height for typical Latin text).
    fn text_height(&self) -> u32;
}

impl<M: FontMetric + ?Sized> FontMetric for &M {
    fn text_width(&self, text: &str) -> u32 {
        (**self).text_width(text)
    }

    fn text_height(&self) -> u32 {
        (**self).text_height()
    }
}

/// A monospace metric: every character advances by the same amount.
///
/// Deterministic, so layouts computed with it are reproducible without a
/// font file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAdvanceMetric {
    pub advance: u32,
    pub height: u32,
}

impl FixedAdvanceMetric {
    pub fn new(advance: u32, height: u32) -> Self {
        Self { advance, height }
    }
}

impl FontMetric for FixedAdvanceMetric {
    fn text_width(&self, text: &str) -> u32 {
        (text.chars().count() as u32).saturating_mul(self.advance)
    }

    fn text_height(&self) -> u32 {
        self.height
    }
}
