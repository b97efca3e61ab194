//! Run the HTTP endpoint.

use std::sync::Arc;

use titlecard_common::config::AppConfig;
use titlecard_render_engine::FfmpegComposer;

pub async fn run(mut config: AppConfig, bind: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }

    let composer = FfmpegComposer::from_config(&config.render)
        .map_err(|e| anyhow::anyhow!("Failed to set up composer: {e}"))?;

    titlecard_server::serve(&config, Arc::new(composer)).await?;
    Ok(())
}
