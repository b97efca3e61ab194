//! Router tests against a local source server and an in-memory backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use titlecard_common::config::RenderDefaults;
use titlecard_common::error::{TitlecardError, TitlecardResult};
use titlecard_render_engine::ComposeBackend;
use titlecard_server::fetch::{build_client, fetch_video};
use titlecard_server::{build_router, AppState};
use tower::ServiceExt;

const SOURCE_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42 fake source";

/// Records calls and answers with a marker payload, or a fixed error.
#[derive(Default)]
struct FakeComposer {
    calls: AtomicUsize,
    seen: Mutex<Option<(Vec<u8>, String, u32)>>,
    fail_with_decode: bool,
}

impl ComposeBackend for FakeComposer {
    fn compose(&self, video: &[u8], text: &str, duration_secs: u32) -> TitlecardResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock().unwrap() = Some((video.to_vec(), text.to_string(), duration_secs));
        if self.fail_with_decode {
            return Err(TitlecardError::decode("input is not a video"));
        }
        let mut out = video.to_vec();
        out.extend_from_slice(format!("|card:{text}:{duration_secs}").as_bytes());
        Ok(out)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Serve `/video.mp4` with fixed bytes and `/slow.mp4` after a 5s stall;
/// every other path is a 404.
async fn spawn_source_server() -> String {
    let app = Router::new()
        .route("/video.mp4", get(|| async { SOURCE_BYTES }))
        .route(
            "/slow.mp4",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                SOURCE_BYTES
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn router_with(backend: Arc<FakeComposer>) -> Router {
    router_with_render(
        backend,
        RenderDefaults {
            max_duration_secs: 60,
            ..RenderDefaults::default()
        },
    )
}

fn router_with_render(backend: Arc<FakeComposer>, render: RenderDefaults) -> Router {
    titlecard_common::logging::init_test_logging();
    build_router(AppState::new(backend, &render).unwrap())
}

fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

fn post(uri: String) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_appends_card_and_returns_mp4() {
    let base = spawn_source_server().await;
    let backend = Arc::new(FakeComposer::default());
    let app = router_with(Arc::clone(&backend));

    let uri = format!(
        "/addStaticTextFrame?fileUrl={}&text={}&durationSeconds=3",
        encode(&format!("{base}/video.mp4")),
        encode("Hello World")
    );
    let response = app.oneshot(post(uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "video/mp4"
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.starts_with(SOURCE_BYTES));
    assert!(body.ends_with(b"|card:Hello World:3"));

    let seen = backend.seen.lock().unwrap().clone().unwrap();
    assert_eq!(seen.0, SOURCE_BYTES);
    assert_eq!(seen.1, "Hello World");
    assert_eq!(seen.2, 3);
}

#[tokio::test]
async fn test_duration_defaults_to_five_seconds() {
    let base = spawn_source_server().await;
    let backend = Arc::new(FakeComposer::default());
    let app = router_with(Arc::clone(&backend));

    let uri = format!(
        "/addStaticTextFrame/?fileUrl={}&text=Intro",
        encode(&format!("{base}/video.mp4"))
    );
    let response = app.oneshot(post(uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.seen.lock().unwrap().as_ref().unwrap().2, 5);
}

#[tokio::test]
async fn test_unreachable_source_is_fetch_error() {
    let base = spawn_source_server().await;
    let backend = Arc::new(FakeComposer::default());
    let app = router_with(Arc::clone(&backend));

    let uri = format!(
        "/addStaticTextFrame?fileUrl={}&text=x",
        encode(&format!("{base}/missing.mp4"))
    );
    let response = app.oneshot(post(uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Unable to fetch the video from the provided URL"));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_text_is_rejected() {
    let backend = Arc::new(FakeComposer::default());
    let app = router_with(Arc::clone(&backend));

    let uri = format!(
        "/addStaticTextFrame?fileUrl={}",
        encode("http://127.0.0.1:9/video.mp4")
    );
    let response = app.oneshot(post(uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["detail"].is_string());
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_out_of_range_durations_are_rejected() {
    for duration in ["0", "-1", "61", "abc"] {
        let backend = Arc::new(FakeComposer::default());
        let app = router_with(Arc::clone(&backend));
        let uri = format!(
            "/addStaticTextFrame?fileUrl={}&text=x&durationSeconds={duration}",
            encode("http://127.0.0.1:9/video.mp4")
        );
        let response = app.oneshot(post(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "duration {duration}");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_undecodable_source_is_unprocessable() {
    let base = spawn_source_server().await;
    let backend = Arc::new(FakeComposer {
        fail_with_decode: true,
        ..FakeComposer::default()
    });
    let app = router_with(Arc::clone(&backend));

    let uri = format!(
        "/addStaticTextFrame?fileUrl={}&text=x",
        encode(&format!("{base}/video.mp4"))
    );
    let response = app.oneshot(post(uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(response).await["detail"]
        .as_str()
        .unwrap()
        .contains("Decode error"));
}

#[tokio::test]
async fn test_get_is_not_allowed() {
    let app = router_with(Arc::new(FakeComposer::default()));
    let response = app
        .oneshot(
            Request::get("/addStaticTextFrame?fileUrl=x&text=y")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_reports_backend() {
    let app = router_with(Arc::new(FakeComposer::default()));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "fake");
    assert_eq!(body["available"], true);
}

#[tokio::test]
async fn test_fetch_video_status_failure() {
    let base = spawn_source_server().await;
    let client = build_client(None).unwrap();

    let ok = fetch_video(&client, &format!("{base}/video.mp4")).await.unwrap();
    assert_eq!(&ok[..], SOURCE_BYTES);

    let err = fetch_video(&client, &format!("{base}/nope")).await.unwrap_err();
    assert!(matches!(err, TitlecardError::Fetch { .. }));
}

#[tokio::test]
async fn test_fetch_timeout_is_fetch_error() {
    let base = spawn_source_server().await;
    let client = build_client(Some(Duration::from_secs(1))).unwrap();

    let started = Instant::now();
    let err = fetch_video(&client, &format!("{base}/slow.mp4"))
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(matches!(err, TitlecardError::Fetch { .. }));
}

#[tokio::test]
async fn test_slow_source_times_out_with_500() {
    let base = spawn_source_server().await;
    let backend = Arc::new(FakeComposer::default());
    let app = router_with_render(
        Arc::clone(&backend),
        RenderDefaults {
            fetch_timeout_secs: Some(1),
            ..RenderDefaults::default()
        },
    );

    let uri = format!(
        "/addStaticTextFrame?fileUrl={}&text=x",
        encode(&format!("{base}/slow.mp4"))
    );
    let started = Instant::now();
    let response = app.oneshot(post(uri)).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(response).await["detail"]
        .as_str()
        .unwrap()
        .contains("Unable to fetch the video from the provided URL"));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}
