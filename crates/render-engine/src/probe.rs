//! Source video inspection via `ffprobe`.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use titlecard_common::error::{TitlecardError, TitlecardResult};

/// Frame rate used when the container does not report a usable one.
const FALLBACK_FRAME_RATE: FrameRate = FrameRate { num: 25, den: 1 };

/// A rational frame rate as reported by ffprobe (e.g. `30000/1001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    /// Parse `"num/den"` or a plain integer. Zero or absurd rates are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (num, den) = match raw.split_once('/') {
            Some((n, d)) => (n.trim().parse::<u32>().ok()?, d.trim().parse::<u32>().ok()?),
            None => (raw.parse::<u32>().ok()?, 1),
        };
        if num == 0 || den == 0 {
            return None;
        }
        let rate = Self { num, den };
        (rate.as_f64() <= 1000.0).then_some(rate)
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Properties of the source video that shape the title card.
///
/// `width` and `height` are the displayed size: a stream tagged with a
/// quarter-turn rotation reports its stored size swapped, matching the frames
/// ffmpeg produces after autorotation.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub frame_rate: FrameRate,
    pub has_audio: bool,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
    tags: Option<ProbeTags>,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

impl ProbeStream {
    /// Clockwise rotation in degrees, normalised to `0..360`. The display
    /// matrix side data wins over the legacy `rotate` tag.
    fn rotation(&self) -> u32 {
        let degrees = self
            .side_data_list
            .iter()
            .find_map(|sd| sd.rotation)
            .or_else(|| {
                self.tags
                    .as_ref()
                    .and_then(|t| t.rotate.as_deref())
                    .and_then(|r| r.trim().parse::<f64>().ok())
            })
            .filter(|d| d.is_finite())
            .unwrap_or(0.0);
        (degrees.round() as i64).rem_euclid(360) as u32
    }
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Inspect the video at `path`.
///
/// Fails with [`TitlecardError::Decode`] if ffprobe cannot read the file or
/// it has no video stream with known dimensions.
pub fn probe_video(path: &Path) -> TitlecardResult<VideoInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "stream=codec_type,width,height,avg_frame_rate,r_frame_rate,duration\
             :stream_side_data=rotation:stream_tags=rotate:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| TitlecardError::unsupported(format!("Failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TitlecardError::decode(format!(
            "Input is not a readable video: {}",
            stderr.trim()
        )));
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let info = parse_probe_output(&raw)?;
    tracing::debug!(
        width = info.width,
        height = info.height,
        duration_secs = info.duration_secs,
        frame_rate = %info.frame_rate,
        has_audio = info.has_audio,
        "Probed source video"
    );
    Ok(info)
}

/// Interpret ffprobe's JSON report.
pub(crate) fn parse_probe_output(raw: &str) -> TitlecardResult<VideoInfo> {
    let probe: ProbeOutput = serde_json::from_str(raw)
        .map_err(|e| TitlecardError::decode(format!("Unreadable ffprobe report: {e}")))?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| TitlecardError::decode("Input has no video stream"))?;

    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(TitlecardError::decode(
                "Video stream does not report its frame size",
            ))
        }
    };
    let (width, height) = match video.rotation() {
        90 | 270 => (height, width),
        _ => (width, height),
    };

    let frame_rate = video
        .avg_frame_rate
        .as_deref()
        .and_then(FrameRate::parse)
        .or_else(|| video.r_frame_rate.as_deref().and_then(FrameRate::parse))
        .unwrap_or(FALLBACK_FRAME_RATE);

    let duration_secs = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);

    let has_audio = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoInfo {
        width,
        height,
        duration_secs,
        frame_rate,
        has_audio,
    })
}
