//! Append a title card to a local file.

use std::io::Write;
use std::path::PathBuf;

use titlecard_common::config::AppConfig;
use titlecard_render_engine::{ComposeProgress, FfmpegComposer, ProgressCallback};

pub async fn run(
    config: &AppConfig,
    input: PathBuf,
    output: PathBuf,
    text: String,
    duration: Option<u32>,
) -> anyhow::Result<()> {
    let duration = duration.unwrap_or(config.render.default_duration_secs);
    if duration == 0 || duration > config.render.max_duration_secs {
        anyhow::bail!(
            "Duration must be between 1 and {} seconds",
            config.render.max_duration_secs
        );
    }

    println!("Rendering title card onto: {}", input.display());
    println!("  Output: {}", output.display());
    println!("  Card: {duration}s");

    let composer = FfmpegComposer::from_config(&config.render)
        .map_err(|e| anyhow::anyhow!("Failed to set up composer: {e}"))?;
    println!("  Font: {}", composer.font().source().display());
    println!(
        "  Encoder: {} ({}), {}",
        composer.settings().video_codec,
        composer.settings().preset,
        composer.settings().audio_codec
    );

    let progress_cb: ProgressCallback = Box::new(|p: ComposeProgress| {
        print!(
            "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_encoded,
            p.total_frames,
            p.eta_secs,
        );
        let _ = std::io::stdout().flush();
    });

    let out = output.clone();
    let result = tokio::task::spawn_blocking(move || {
        composer.render_file(&input, &out, &text, duration, Some(&progress_cb))
    })
    .await?;

    match result {
        Ok(info) => {
            println!(
                "\nDone: {} ({}x{} source, {:.1}s + {duration}s card)",
                output.display(),
                info.width,
                info.height,
                info.duration_secs
            );
            Ok(())
        }
        Err(e) => {
            println!();
            Err(anyhow::anyhow!("Render failed: {e}"))
        }
    }
}
