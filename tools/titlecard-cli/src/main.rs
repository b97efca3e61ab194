//! Titlecard CLI
//!
//! Usage:
//!   titlecard serve [--bind ADDR] [--config PATH]   Run the HTTP endpoint
//!   titlecard render <INPUT> -o <OUTPUT> --text T   Append a card to a local file
//!   titlecard check                                 Check ffmpeg, ffprobe and fonts
//!   titlecard init-config [--force]                 Write the current config to disk

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "titlecard",
    about = "Append a static text title card to the end of a video",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve POST /addStaticTextFrame
    Serve {
        /// Address to bind, overriding the config file
        #[arg(long)]
        bind: Option<String>,
    },

    /// Append a title card to a local video file
    Render {
        /// Source video
        input: PathBuf,

        /// Output mp4 path
        #[arg(short, long)]
        output: PathBuf,

        /// Card text
        #[arg(long)]
        text: String,

        /// Card duration in seconds
        #[arg(long)]
        duration: Option<u32>,
    },

    /// Check external tools and font availability
    Check,

    /// Write the effective config to the config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) if path.exists() => titlecard_common::config::AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        Some(_) => titlecard_common::config::AppConfig::default(),
        None => titlecard_common::config::AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    titlecard_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Serve { bind } => commands::serve::run(config, bind).await,
        Commands::Render {
            input,
            output,
            text,
            duration,
        } => commands::render::run(&config, input, output, text, duration).await,
        Commands::Check => commands::check::run(&config),
        Commands::InitConfig { force } => commands::init_config::run(&config, cli.config, force),
    }
}
