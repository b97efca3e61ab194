//! Shared server state.

use std::sync::Arc;
use std::time::Duration;

use titlecard_common::config::RenderDefaults;
use titlecard_common::error::TitlecardResult;
use titlecard_render_engine::ComposeBackend;

use crate::fetch::build_client;

/// Bounds on the per-request card duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationLimits {
    pub default_secs: u32,
    pub max_secs: u32,
}

impl From<&RenderDefaults> for DurationLimits {
    fn from(render: &RenderDefaults) -> Self {
        Self {
            default_secs: render.default_duration_secs,
            max_secs: render.max_duration_secs,
        }
    }
}

/// State handed to every request handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ComposeBackend>,
    pub client: reqwest::Client,
    pub limits: DurationLimits,
}

impl AppState {
    pub fn new(backend: Arc<dyn ComposeBackend>, render: &RenderDefaults) -> TitlecardResult<Self> {
        Ok(Self {
            backend,
            client: build_client(render.fetch_timeout_secs.map(Duration::from_secs))?,
            limits: DurationLimits::from(render),
        })
    }
}
