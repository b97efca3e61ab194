//! Download of the source video.

use std::time::Duration;

use bytes::Bytes;
use titlecard_common::error::{TitlecardError, TitlecardResult};

/// Build the HTTP client used for source downloads.
///
/// `timeout` bounds the whole request (connect + body); `None` leaves it unbounded.
pub fn build_client(timeout: Option<Duration>) -> TitlecardResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| TitlecardError::config(format!("Failed to build HTTP client: {e}")))
}

/// GET `url` and return the body as opaque bytes.
///
/// Any non-success status or transport failure is a [`TitlecardError::Fetch`].
pub async fn fetch_video(client: &reqwest::Client, url: &str) -> TitlecardResult<Bytes> {
    tracing::debug!(url, "Fetching source video");
    let response = client.get(url).send().await.map_err(|e| {
        TitlecardError::fetch(format!(
            "Unable to fetch the video from the provided URL: {e}"
        ))
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(TitlecardError::fetch(format!(
            "Unable to fetch the video from the provided URL (status {status})"
        )));
    }

    let body = response.bytes().await.map_err(|e| {
        TitlecardError::fetch(format!("Failed reading the video response body: {e}"))
    })?;
    tracing::debug!(url, bytes = body.len(), "Fetched source video");
    Ok(body)
}

/// Check that `raw` is an absolute http(s) URL.
pub fn parse_source_url(raw: &str) -> TitlecardResult<reqwest::Url> {
    let url = reqwest::Url::parse(raw.trim())
        .map_err(|e| TitlecardError::invalid_input(format!("fileUrl is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TitlecardError::invalid_input(format!(
            "fileUrl must use http or https, not {other}"
        ))),
    }
}
