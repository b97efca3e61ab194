//! HTTP routes.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use titlecard_common::error::{TitlecardError, TitlecardResult};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::fetch::{fetch_video, parse_source_url};
use crate::state::{AppState, DurationLimits};

/// Path of the title-card endpoint.
pub const ADD_TEXT_FRAME_PATH: &str = "/addStaticTextFrame";

/// Query parameters of `POST /addStaticTextFrame`, as sent.
#[derive(Debug, Default, Deserialize)]
pub struct TitleFrameParams {
    #[serde(rename = "fileUrl")]
    pub file_url: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "durationSeconds", alias = "duration_seconds")]
    pub duration_seconds: Option<i64>,
}

/// A validated title-card request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFrameRequest {
    pub file_url: reqwest::Url,
    pub text: String,
    pub duration_secs: u32,
}

impl TitleFrameParams {
    /// Check required fields and the duration policy: `1..=limits.max_secs`,
    /// defaulting to `limits.default_secs`.
    pub fn validate(self, limits: &DurationLimits) -> TitlecardResult<TitleFrameRequest> {
        let raw_url = self
            .file_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| TitlecardError::invalid_input("fileUrl is required"))?;
        let file_url = parse_source_url(&raw_url)?;

        let text = self
            .text
            .ok_or_else(|| TitlecardError::invalid_input("text is required"))?;

        let requested = self.duration_seconds.unwrap_or(limits.default_secs as i64);
        if requested < 1 || requested > limits.max_secs as i64 {
            return Err(TitlecardError::invalid_input(format!(
                "durationSeconds must be between 1 and {}, got {requested}",
                limits.max_secs
            )));
        }

        Ok(TitleFrameRequest {
            file_url,
            text,
            duration_secs: requested as u32,
        })
    }
}

/// Build the router with request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(ADD_TEXT_FRAME_PATH, post(add_static_text_frame))
        .route("/addStaticTextFrame/", post(add_static_text_frame))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Fetch the source, append the card, respond with the MP4 bytes.
async fn add_static_text_frame(
    State(state): State<AppState>,
    params: Result<Query<TitleFrameParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| TitlecardError::invalid_input(e.body_text()))?;
    let request = params.validate(&state.limits)?;
    tracing::info!(
        url = %request.file_url,
        duration_secs = request.duration_secs,
        text_chars = request.text.chars().count(),
        "Title card requested"
    );

    let video = fetch_video(&state.client, request.file_url.as_str()).await?;

    let backend = Arc::clone(&state.backend);
    let TitleFrameRequest {
        text,
        duration_secs,
        ..
    } = request;
    let output = tokio::task::spawn_blocking(move || backend.compose(&video, &text, duration_secs))
        .await
        .map_err(|e| TitlecardError::Other(anyhow::anyhow!("Compose task failed: {e}")))??;

    tracing::info!(bytes = output.len(), "Title card composed");
    Ok(([(header::CONTENT_TYPE, "video/mp4")], output).into_response())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let backend = Arc::clone(&state.backend);
    let available = tokio::task::spawn_blocking(move || backend.is_available())
        .await
        .unwrap_or(false);
    Json(serde_json::json!({
        "status": if available { "ok" } else { "degraded" },
        "backend": state.backend.name(),
        "available": available,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> DurationLimits {
        DurationLimits {
            default_secs: 5,
            max_secs: 60,
        }
    }

    fn params(url: Option<&str>, text: Option<&str>, secs: Option<i64>) -> TitleFrameParams {
        TitleFrameParams {
            file_url: url.map(str::to_string),
            text: text.map(str::to_string),
            duration_seconds: secs,
        }
    }

    #[test]
    fn test_duration_defaults() {
        let request = params(Some("https://cdn.example.com/v.mp4"), Some("Hi"), None)
            .validate(&limits())
            .unwrap();
        assert_eq!(request.duration_secs, 5);
        assert_eq!(request.text, "Hi");
    }

    #[test]
    fn test_duration_bounds() {
        for bad in [0, -3, 61] {
            let err = params(Some("https://a.b/v.mp4"), Some("x"), Some(bad))
                .validate(&limits())
                .unwrap_err();
            assert!(matches!(err, TitlecardError::InvalidInput { .. }));
        }
        let ok = params(Some("https://a.b/v.mp4"), Some("x"), Some(60)).validate(&limits());
        assert_eq!(ok.unwrap().duration_secs, 60);
    }

    #[test]
    fn test_required_fields() {
        assert!(params(None, Some("x"), None).validate(&limits()).is_err());
        assert!(params(Some("  "), Some("x"), None).validate(&limits()).is_err());
        assert!(params(Some("https://a.b/v.mp4"), None, None)
            .validate(&limits())
            .is_err());
    }

    #[test]
    fn test_empty_text_is_allowed() {
        let request = params(Some("https://a.b/v.mp4"), Some(""), None)
            .validate(&limits())
            .unwrap();
        assert!(request.text.is_empty());
    }
}
