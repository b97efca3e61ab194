//! Titlecard Render Engine
//!
//! Appends a generated title card to a source video.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source bytes ──► scratch/input.mp4 ──► ffprobe (size, fps, audio)
//!                                              │
//! text ──► wrap + place ──► black canvas ──► scratch/card.png
//!                                              │
//!        [source v/a] + [card looped for N s, silence] ──► concat
//!                                                            │
//!                                                            ▼
//!                                               Encode (H.264 + AAC)
//!                                                            │
//!                                                            ▼
//!                                               scratch/output.mp4 ──► bytes
//! ```
//!
//! The scratch directory is removed when the request finishes, whether it
//! succeeded or not.

pub mod card;
pub mod compose;
pub mod ffmpeg;
pub mod font;
pub mod probe;
pub mod scratch;

pub use card::{blank_canvas, draw_title_card, render_card, TEXT_COLOR};
pub use compose::{ComposeBackend, ComposerSettings, FfmpegComposer};
pub use ffmpeg::{check_tools, ComposeProgress, ComposeStage, ProgressCallback, ToolStatus};
pub use font::TitleFont;
pub use probe::{probe_video, FrameRate, VideoInfo};
pub use scratch::ScratchDir;
