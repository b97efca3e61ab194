//! Title-card compose pipeline: source video + still card → one encoded video.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use titlecard_common::config::RenderDefaults;
use titlecard_common::error::{TitlecardError, TitlecardResult};
use titlecard_text_layout::LayoutStyle;

use crate::card::render_card;
use crate::ffmpeg::{check_tools, run_ffmpeg, EncodeInvocation, ProgressCallback};
use crate::font::TitleFont;
use crate::probe::{probe_video, VideoInfo};
use crate::scratch::ScratchDir;

/// Sample rate of the silence laid under the card, and of the joined audio.
const AUDIO_SAMPLE_RATE: u32 = 48_000;

/// Trait for compose backends.
pub trait ComposeBackend: Send + Sync {
    /// Append a title card showing `text` for `duration_secs` to the video in
    /// `video`, returning the encoded result.
    fn compose(&self, video: &[u8], text: &str, duration_secs: u32) -> TitlecardResult<Vec<u8>>;

    /// Check if this backend can run on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Encoder and layout settings for [`FfmpegComposer`].
#[derive(Debug, Clone)]
pub struct ComposerSettings {
    /// Program run for the encode; `ffmpeg` resolved from `PATH` by default.
    pub ffmpeg_bin: String,
    pub layout: LayoutStyle,
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub temp_root: Option<PathBuf>,
    pub encode_timeout: Option<Duration>,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self::from(&RenderDefaults::default())
    }
}

impl From<&RenderDefaults> for ComposerSettings {
    fn from(render: &RenderDefaults) -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            layout: LayoutStyle {
                line_spacing: render.line_spacing,
                max_width_ratio: render.max_width_ratio,
            },
            video_codec: render.video_codec.clone(),
            audio_codec: render.audio_codec.clone(),
            preset: render.preset.clone(),
            temp_root: render.temp_dir.clone(),
            encode_timeout: render.encode_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Composes title cards with the `ffmpeg`/`ffprobe` executables.
#[derive(Debug)]
pub struct FfmpegComposer {
    font: TitleFont,
    settings: ComposerSettings,
}

impl FfmpegComposer {
    pub fn new(font: TitleFont, settings: ComposerSettings) -> Self {
        Self { font, settings }
    }

    /// Load the configured (or a system) font and build a composer.
    pub fn from_config(render: &RenderDefaults) -> TitlecardResult<Self> {
        let font = TitleFont::discover(render.font_path.as_deref(), render.font_px)?;
        tracing::info!(font = %font.source().display(), px = render.font_px, "Loaded title font");
        Ok(Self::new(font, ComposerSettings::from(render)))
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    pub fn font(&self) -> &TitleFont {
        &self.font
    }

    /// Compose from in-memory bytes. Scratch files are removed on every path.
    pub fn compose_bytes(
        &self,
        video: &[u8],
        text: &str,
        duration_secs: u32,
        progress: Option<&ProgressCallback>,
    ) -> TitlecardResult<Vec<u8>> {
        if video.is_empty() {
            return Err(TitlecardError::decode("Input video is empty"));
        }
        validate_duration(duration_secs)?;

        let scratch = ScratchDir::new(self.settings.temp_root.as_deref())?;
        let input = scratch.input_path();
        let output = scratch.output_path();
        std::fs::write(&input, video)?;

        self.compose_paths(
            &input,
            &scratch.card_path(),
            &output,
            text,
            duration_secs,
            progress,
        )?;

        let bytes = std::fs::read(&output)?;
        scratch.close()?;
        Ok(bytes)
    }

    /// Compose a local file into `output`. Returns the probed source properties.
    pub fn render_file(
        &self,
        input: &Path,
        output: &Path,
        text: &str,
        duration_secs: u32,
        progress: Option<&ProgressCallback>,
    ) -> TitlecardResult<VideoInfo> {
        validate_duration(duration_secs)?;
        if !input.is_file() {
            return Err(TitlecardError::invalid_input(format!(
                "Input file not found: {}",
                input.display()
            )));
        }
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let scratch = ScratchDir::new(self.settings.temp_root.as_deref())?;
        let info = self.compose_paths(
            input,
            &scratch.card_path(),
            output,
            text,
            duration_secs,
            progress,
        )?;
        scratch.close()?;
        Ok(info)
    }

    fn compose_paths(
        &self,
        input: &Path,
        card: &Path,
        output: &Path,
        text: &str,
        duration_secs: u32,
        progress: Option<&ProgressCallback>,
    ) -> TitlecardResult<VideoInfo> {
        let started = Instant::now();
        let info = probe_video(input)?;

        let (canvas, text_layout) =
            render_card(info.width, info.height, text, &self.settings.layout, &self.font);
        canvas
            .save(card)
            .map_err(|e| TitlecardError::encode(format!("Failed to write title card: {e}")))?;

        let invocation = build_invocation(
            &info,
            input,
            card,
            output,
            duration_secs,
            &self.settings,
        );
        tracing::info!(
            width = info.width,
            height = info.height,
            source_secs = info.duration_secs,
            card_secs = duration_secs,
            lines = text_layout.lines.len(),
            has_audio = info.has_audio,
            "Composing title card"
        );

        run_ffmpeg(&invocation, self.settings.encode_timeout, progress)?;

        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Title card compose finished"
        );
        Ok(info)
    }
}

impl ComposeBackend for FfmpegComposer {
    fn compose(&self, video: &[u8], text: &str, duration_secs: u32) -> TitlecardResult<Vec<u8>> {
        self.compose_bytes(video, text, duration_secs, None)
    }

    fn is_available(&self) -> bool {
        check_tools().all_available()
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

fn validate_duration(duration_secs: u32) -> TitlecardResult<()> {
    if duration_secs == 0 {
        return Err(TitlecardError::invalid_input(
            "Title card duration must be at least 1 second",
        ));
    }
    Ok(())
}

/// Build the ffmpeg arguments that append the looped card to the source.
///
/// Both segments are normalised to the source frame size, square pixels, the
/// source frame rate and one pixel format (see [`pixel_format`]) so the concat
/// filter accepts them. When the source has audio, the card gets generated
/// silence of the same length.
pub(crate) fn build_invocation(
    info: &VideoInfo,
    input: &Path,
    card: &Path,
    output: &Path,
    duration_secs: u32,
    settings: &ComposerSettings,
) -> EncodeInvocation {
    let fps = info.frame_rate.to_string();
    let card_secs = duration_secs.to_string();
    let pix_fmt = pixel_format(info.width, info.height);
    let normalize = format!(
        "scale={w}:{h},setsar=1,fps={fps},format={pix_fmt}",
        w = info.width,
        h = info.height,
    );

    let mut args: Vec<String> = [
        "-y",
        "-hide_banner",
        "-loglevel",
        "error",
        "-nostats",
        "-progress",
        "pipe:1",
        "-i",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.push(input.display().to_string());

    args.extend(
        ["-loop", "1", "-framerate", fps.as_str(), "-t", card_secs.as_str(), "-i"]
            .iter()
            .map(|s| s.to_string()),
    );
    args.push(card.display().to_string());

    let filter = if info.has_audio {
        args.extend(
            ["-f", "lavfi", "-t", card_secs.as_str(), "-i"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(format!(
            "anullsrc=channel_layout=stereo:sample_rate={AUDIO_SAMPLE_RATE}"
        ));
        let audio_format =
            format!("aformat=sample_fmts=fltp:sample_rates={AUDIO_SAMPLE_RATE}:channel_layouts=stereo");
        format!(
            "[0:v:0]{normalize}[v0];[1:v:0]{normalize}[v1];\
             [0:a:0]aresample={AUDIO_SAMPLE_RATE},{audio_format}[a0];[2:a:0]{audio_format}[a1];\
             [v0][a0][v1][a1]concat=n=2:v=1:a=1[vout][aout]"
        )
    } else {
        format!("[0:v:0]{normalize}[v0];[1:v:0]{normalize}[v1];[v0][v1]concat=n=2:v=1:a=0[vout]")
    };

    args.push("-filter_complex".to_string());
    args.push(filter);
    args.push("-map".to_string());
    args.push("[vout]".to_string());
    if info.has_audio {
        args.push("-map".to_string());
        args.push("[aout]".to_string());
    }

    args.append(&mut codec_args(settings, info.has_audio, pix_fmt));
    args.push(output.display().to_string());

    let expected_duration_secs = info.duration_secs + duration_secs as f64;
    EncodeInvocation {
        program: settings.ffmpeg_bin.clone(),
        args,
        expected_duration_secs,
        total_frames: (expected_duration_secs * info.frame_rate.as_f64()).ceil() as u64,
    }
}

/// 4:2:0 chroma needs even dimensions in libx264; odd frames keep full chroma.
pub(crate) fn pixel_format(width: u32, height: u32) -> &'static str {
    if width % 2 == 0 && height % 2 == 0 {
        "yuv420p"
    } else {
        "yuv444p"
    }
}

fn codec_args(settings: &ComposerSettings, has_audio: bool, pix_fmt: &str) -> Vec<String> {
    let mut args = vec![
        "-c:v".to_string(),
        settings.video_codec.clone(),
        "-preset".to_string(),
        settings.preset.clone(),
        "-pix_fmt".to_string(),
        pix_fmt.to_string(),
    ];
    if has_audio {
        args.push("-c:a".to_string());
        args.push(settings.audio_codec.clone());
    }
    args.push("-movflags".to_string());
    args.push("+faststart".to_string());
    args
}
