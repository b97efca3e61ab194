//! ffmpeg process driver: runs an encode, follows its progress, enforces an
//! optional deadline.

use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use titlecard_common::error::{TitlecardError, TitlecardResult};

/// Progress callback for compose encodes.
pub type ProgressCallback = Box<dyn Fn(ComposeProgress) + Send + Sync>;

/// Compose progress report.
#[derive(Debug, Clone)]
pub struct ComposeProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames encoded so far (estimated from output time).
    pub frames_encoded: u64,

    /// Total frames expected in the output.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ComposeStage,
}

/// Stages of a compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeStage {
    Preparing,
    Encoding,
    Finalizing,
    Complete,
}

/// An ffmpeg invocation together with what its output should look like.
#[derive(Debug, Clone)]
pub struct EncodeInvocation {
    /// Executable to run, normally `ffmpeg`.
    pub program: String,
    pub args: Vec<String>,
    pub expected_duration_secs: f64,
    pub total_frames: u64,
}

/// Availability of the external tools the pipeline shells out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    pub ffmpeg: bool,
    pub ffprobe: bool,
}

impl ToolStatus {
    pub fn all_available(&self) -> bool {
        self.ffmpeg && self.ffprobe
    }
}

/// Check whether `ffmpeg` and `ffprobe` are on `PATH`.
pub fn check_tools() -> ToolStatus {
    ToolStatus {
        ffmpeg: command_exists("ffmpeg"),
        ffprobe: command_exists("ffprobe"),
    }
}

fn command_exists(binary: &str) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Run ffmpeg to completion.
///
/// The invocation must include `-progress pipe:1`. When `timeout` is set and
/// elapses first, the process is killed and an encode error is returned.
pub fn run_ffmpeg(
    invocation: &EncodeInvocation,
    timeout: Option<Duration>,
    progress: Option<&ProgressCallback>,
) -> TitlecardResult<()> {
    tracing::debug!(program = %invocation.program, args = ?invocation.args, "Running ffmpeg");
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(cb) = progress {
        cb(ComposeProgress {
            progress: 0.0,
            frames_encoded: 0,
            total_frames: invocation.total_frames,
            eta_secs: 0.0,
            stage: ComposeStage::Preparing,
        });
    }

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|e| {
        TitlecardError::unsupported(format!("Failed to start {}: {e}", invocation.program))
    })?;

    tracing::debug!(
        pid = child.id(),
        total_frames = invocation.total_frames,
        "ffmpeg process started"
    );

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| TitlecardError::encode("Failed to capture ffmpeg stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| TitlecardError::encode("Failed to capture ffmpeg stderr"))?;

    // Drain stderr concurrently to avoid ffmpeg blocking on a full stderr pipe.
    let stderr_task = std::thread::spawn(move || -> String {
        let mut reader = BufReader::new(stderr);
        let mut output = String::new();
        match reader.read_to_string(&mut output) {
            Ok(_) => output,
            Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
        }
    });

    let child = Arc::new(Mutex::new(child));
    let timed_out = Arc::new(AtomicBool::new(false));
    let (done_tx, done_rx) = mpsc::channel::<()>();
    let watchdog = timeout.map(|limit| {
        let child = Arc::clone(&child);
        let timed_out = Arc::clone(&timed_out);
        std::thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(limit) {
                timed_out.store(true, Ordering::SeqCst);
                if let Ok(mut child) = child.lock() {
                    let _ = child.kill();
                }
            }
        })
    });

    let report = follow_progress(stdout, invocation, start, progress);

    drop(done_tx);
    let status = child
        .lock()
        .map_err(|_| TitlecardError::encode("ffmpeg process handle poisoned"))?
        .wait()
        .map_err(|e| TitlecardError::encode(format!("Failed to wait on ffmpeg: {e}")));
    if let Some(handle) = watchdog {
        let _ = handle.join();
    }
    let stderr_output = stderr_task
        .join()
        .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

    let status = status?;
    report?;

    if !status.success() {
        if timed_out.load(Ordering::SeqCst) {
            let limit = timeout.map(|t| t.as_secs()).unwrap_or_default();
            return Err(TitlecardError::encode(format!(
                "ffmpeg exceeded the {limit}s encode timeout"
            )));
        }
        return Err(TitlecardError::encode(format!(
            "ffmpeg failed (status {}): {}",
            status,
            stderr_output.trim()
        )));
    }

    if let Some(cb) = progress {
        cb(ComposeProgress {
            progress: 1.0,
            frames_encoded: invocation.total_frames,
            total_frames: invocation.total_frames,
            eta_secs: 0.0,
            stage: ComposeStage::Complete,
        });
    }

    tracing::debug!(
        elapsed_secs = start.elapsed().as_secs_f64(),
        "ffmpeg finished"
    );
    Ok(())
}

/// Read `-progress` key/value lines until ffmpeg closes stdout.
fn follow_progress(
    stdout: impl Read,
    invocation: &EncodeInvocation,
    start: Instant,
    progress: Option<&ProgressCallback>,
) -> TitlecardResult<()> {
    let mut reader = BufReader::new(stdout);
    let mut line = String::new();

    let mut latest = ProgressState::default();
    let mut last_progress_secs = 0.0f64;
    let mut last_progress_wall = Instant::now();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|e| TitlecardError::encode(format!("Failed reading ffmpeg progress: {e}")))?;
        if bytes == 0 {
            break;
        }

        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        latest.update(key, value);
        if key != "progress" {
            continue;
        }

        if latest.out_time_secs > last_progress_secs + 0.001 {
            last_progress_secs = latest.out_time_secs;
            last_progress_wall = Instant::now();
        }
        let report = progress_report(
            &latest,
            invocation.total_frames,
            invocation.expected_duration_secs,
            start.elapsed().as_secs_f64(),
        );
        tracing::trace!(progress = report.progress, eta_secs = report.eta_secs, "ffmpeg progress");
        if let Some(cb) = progress {
            cb(report);
        }
        if last_progress_wall.elapsed().as_secs() >= 10 {
            tracing::warn!(
                out_time_secs = latest.out_time_secs,
                elapsed_secs = start.elapsed().as_secs_f64(),
                "No ffmpeg progress advancement for 10s"
            );
            last_progress_wall = Instant::now();
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports microseconds under both names.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    total_frames: u64,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> ComposeProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let frames_encoded = (progress * total_frames as f64).round() as u64;
    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    ComposeProgress {
        progress: if state.complete { 1.0 } else { progress },
        frames_encoded,
        total_frames,
        eta_secs,
        stage: if state.complete {
            ComposeStage::Finalizing
        } else {
            ComposeStage::Encoding
        },
    }
}
