//! Font loading and glyph metrics for the title card.

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use imageproc::drawing::text_size;
use titlecard_common::error::{TitlecardError, TitlecardResult};
use titlecard_text_layout::FontMetric;

/// Well-known locations of a plain sans-serif face, tried in order when no
/// font is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Reference string for the height of one line of text.
const LINE_HEIGHT_PROBE: &str = "Test";

/// A loaded font at a fixed pixel size.
pub struct TitleFont {
    font: FontVec,
    scale: PxScale,
    line_height: u32,
    source: PathBuf,
}

impl std::fmt::Debug for TitleFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleFont")
            .field("source", &self.source)
            .field("px", &self.scale.y)
            .field("line_height", &self.line_height)
            .finish()
    }
}

impl TitleFont {
    /// Load a TrueType/OpenType font file.
    pub fn load(path: &Path, px: f32) -> TitlecardResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| TitlecardError::FontLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_bytes(bytes, px, path.to_path_buf())
    }

    /// Build a font from raw file contents. `source` is only used for diagnostics.
    pub fn from_bytes(bytes: Vec<u8>, px: f32, source: PathBuf) -> TitlecardResult<Self> {
        if !(px.is_finite() && px > 0.0) {
            return Err(TitlecardError::FontLoad {
                path: source,
                message: format!("invalid pixel size {px}"),
            });
        }
        let font = FontVec::try_from_vec(bytes).map_err(|e| TitlecardError::FontLoad {
            path: source.clone(),
            message: e.to_string(),
        })?;
        let scale = PxScale::from(px);
        let (_, line_height) = text_size(scale, &font, LINE_HEIGHT_PROBE);

        Ok(Self {
            font,
            scale,
            line_height,
            source,
        })
    }

    /// Load `explicit` if given, otherwise the first system font that exists.
    pub fn discover(explicit: Option<&Path>, px: f32) -> TitlecardResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path, px);
        }

        let path = find_system_font().ok_or_else(|| {
            TitlecardError::config(
                "No usable font found; set render.font_path to a .ttf or .otf file",
            )
        })?;
        tracing::debug!(font = %path.display(), "Using system font");
        Self::load(&path, px)
    }

    pub fn font(&self) -> &FontVec {
        &self.font
    }

    pub fn scale(&self) -> PxScale {
        self.scale
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Distance from the top of a line box to its baseline, in pixels.
    pub fn ascent(&self) -> f32 {
        self.font.as_scaled(self.scale).ascent()
    }
}

impl FontMetric for TitleFont {
    fn text_width(&self, text: &str) -> u32 {
        text_size(self.scale, &self.font, text).0
    }

    fn text_height(&self) -> u32 {
        self.line_height
    }
}

/// First existing entry of the system font search list.
pub fn find_system_font() -> Option<PathBuf> {
    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

#[cfg(test)]
pub(crate) fn test_font() -> Option<TitleFont> {
    let path = find_system_font()?;
    TitleFont::load(&path, 32.0).ok()
}
