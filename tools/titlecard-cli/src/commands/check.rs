//! Check external tools and fonts.

use titlecard_common::config::{config_file_path, AppConfig};
use titlecard_render_engine::{check_tools, TitleFont};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Titlecard System Check");
    println!("{}", "=".repeat(50));

    let tools = check_tools();
    report("ffmpeg", tools.ffmpeg, "install ffmpeg and put it on PATH");
    report("ffprobe", tools.ffprobe, "ships with ffmpeg");

    match TitleFont::discover(config.render.font_path.as_deref(), config.render.font_px) {
        Ok(font) => println!(
            "[OK] Font: {} ({}px)",
            font.source().display(),
            config.render.font_px
        ),
        Err(e) => println!("[MISSING] Font: {e}"),
    }

    println!("     Config: {}", config_file_path().display());
    println!("     Bind address: {}", config.server.bind_address);

    println!();
    if tools.all_available() {
        println!("All required tools are available. Titlecard is ready.");
    } else {
        println!("Some required tools are missing. See above for fixes.");
    }
    Ok(())
}

fn report(name: &str, ok: bool, hint: &str) {
    if ok {
        println!("[OK] {name}");
    } else {
        println!("[MISSING] {name}: {hint}");
    }
}
