use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use claw_flow::{
    FlowRunner, InMemorySessionStorage, LogSink, ProblemCatalog, RecordSink, SessionStorage,
    create_flow_runner,
};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, debug, error, info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    line::{LineClient, SIGNATURE_HEADER, WebhookBody, WebhookEvent, verify_signature},
    sheets::AppsScriptSink,
};

const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct AppState {
    pub flow_runner: FlowRunner,
    pub line: LineClient,
    pub channel_secret: Option<String>,
}

pub fn build_app_state(config: &Config) -> Result<AppState> {
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("failed to build HTTP client")?;

    let sink: Arc<dyn RecordSink> = match &config.apps_script_url {
        Some(url) => {
            info!("Using Apps Script record sink");
            Arc::new(AppsScriptSink::new(http.clone(), url.clone()))
        }
        None => {
            warn!("GOOGLE_APPS_SCRIPT_URL not set, claims will only be logged");
            Arc::new(LogSink)
        }
    };

    if config.channel_secret.is_none() {
        warn!("LINE_CHANNEL_SECRET not set, every webhook will be rejected");
    }

    let flow_runner = create_flow_runner(
        Arc::new(ProblemCatalog::default()),
        Arc::new(InMemorySessionStorage::new()),
        sink,
    )
    .context("failed to build support workflow")?;

    Ok(AppState {
        flow_runner,
        line: LineClient::new(
            http,
            &config.line_api_base,
            config.channel_access_token.clone(),
        ),
        channel_secret: config.channel_secret.clone(),
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/webhook", post(webhook))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(state)
}

/// Tags every request with a correlation id, in a span and a header.
async fn correlation_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&correlation_id).ok();

    if let Some(value) = &header {
        request.headers_mut().insert(CORRELATION_HEADER, value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

async fn root() -> &'static str {
    "Claw machine support bot is running"
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "sessions": state.flow_runner.storage().len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(secret) = state.channel_secret.as_deref() else {
        warn!("Webhook rejected, channel secret not configured");
        return (StatusCode::BAD_REQUEST, "Invalid signature").into_response();
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if let Err(e) = verify_signature(&body, signature, secret) {
        warn!(error = %e, "Webhook rejected");
        return (StatusCode::BAD_REQUEST, "Invalid signature").into_response();
    }

    let payload: WebhookBody = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Webhook body is not valid JSON");
            return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };

    debug!(events = payload.events.len(), "Webhook accepted");
    tokio::spawn(process_events(state, payload.events).in_current_span());

    (StatusCode::OK, "OK").into_response()
}

/// Runs a batch in order. Failures are logged per event and never abort
/// the rest of the batch.
pub async fn process_events(state: AppState, events: Vec<WebhookEvent>) {
    for event in events {
        let Some(event) = event.as_text_event() else {
            debug!(event_type = %event.event_type, "Ignoring non-text event");
            continue;
        };

        let reply = match state.flow_runner.handle(&event.user_id, &event.text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(user_id = %event.user_id, error = %e, "Failed to handle message");
                continue;
            }
        };

        if let Err(e) = state.line.reply(&event.reply_token, &reply).await {
            error!(user_id = %event.user_id, error = %e, "Failed to send reply");
        }
    }
}

/// Periodically drops sessions idle for longer than `max_idle`.
pub fn spawn_session_sweeper(
    storage: Arc<dyn SessionStorage>,
    max_idle: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match storage.evict_idle(max_idle).await {
                Ok(0) => {}
                Ok(evicted) => info!(evicted, remaining = storage.len(), "Evicted idle sessions"),
                Err(e) => error!(error = %e, "Session sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::sign;
    use claw_flow::Step;
    use httpmock::prelude::*;
    use tower::ServiceExt;

    const SECRET: &str = "channel-secret";

    fn state_for(line_base: &str, secret: Option<&str>) -> AppState {
        let config = Config::from_lookup(|key| match key {
            "LINE_CHANNEL_ACCESS_TOKEN" => Some("token".into()),
            "LINE_API_BASE" => Some(line_base.into()),
            "LINE_CHANNEL_SECRET" => secret.map(str::to_string),
            _ => None,
        })
        .unwrap();
        build_app_state(&config).unwrap()
    }

    fn text_event(user_id: &str, reply_token: &str, text: &str) -> Value {
        json!({
            "type": "message",
            "replyToken": reply_token,
            "source": { "type": "user", "userId": user_id },
            "message": { "type": "text", "id": "1", "text": text }
        })
    }

    fn webhook_request(body: &str, signature: Option<String>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn root_and_health_respond() {
        let app = build_router(state_for("http://127.0.0.1:9", Some(SECRET)));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(CORRELATION_HEADER));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let health: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["sessions"], 0);
        assert!(health["timestamp"].is_string());
    }

    #[tokio::test]
    async fn bad_or_missing_signature_is_rejected() {
        let app = build_router(state_for("http://127.0.0.1:9", Some(SECRET)));
        let body = json!({ "events": [] }).to_string();

        let response = app
            .clone()
            .oneshot(webhook_request(&body, Some(sign(body.as_bytes(), "wrong"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Invalid signature");

        let response = app.oneshot(webhook_request(&body, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_secret_rejects_every_webhook() {
        let app = build_router(state_for("http://127.0.0.1:9", None));
        let body = json!({ "events": [] }).to_string();
        let response = app
            .oneshot(webhook_request(&body, Some(sign(body.as_bytes(), SECRET))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signed_invalid_json_is_bad_request() {
        let app = build_router(state_for("http://127.0.0.1:9", Some(SECRET)));
        let body = "{not json";
        let response = app
            .oneshot(webhook_request(body, Some(sign(body.as_bytes(), SECRET))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Invalid JSON");
    }

    #[tokio::test]
    async fn signed_text_event_is_answered_through_line() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/bot/message/reply")
                    .header("authorization", "Bearer token")
                    .json_body_includes(json!({ "replyToken": "reply-42" }).to_string());
                then.status(200).json_body(json!({}));
            })
            .await;

        let state = state_for(&server.base_url(), Some(SECRET));
        let app = build_router(state.clone());
        let body = json!({ "events": [text_event("U42", "reply-42", "สวัสดี")] }).to_string();

        let response = app
            .oneshot(webhook_request(&body, Some(sign(body.as_bytes(), SECRET))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");

        for _ in 0..100 {
            if mock.calls_async().await == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        mock.assert_calls_async(1).await;

        let session = state.flow_runner.storage().get("U42").await.unwrap().unwrap();
        assert_eq!(session.step, Step::ProblemSelection);
    }

    #[tokio::test]
    async fn batch_is_processed_in_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/bot/message/reply");
                then.status(200).json_body(json!({}));
            })
            .await;

        let state = state_for(&server.base_url(), Some(SECRET));
        let events: WebhookBody = serde_json::from_value(json!({
            "events": [
                text_event("U7", "r1", "สวัสดี"),
                { "type": "follow", "replyToken": "r2", "source": { "userId": "U7" } },
                text_event("U7", "r3", "1"),
            ]
        }))
        .unwrap();

        process_events(state.clone(), events.events).await;

        mock.assert_calls_async(2).await;
        let session = state.flow_runner.storage().get("U7").await.unwrap().unwrap();
        assert_eq!(session.step, Step::Troubleshooting);
    }

    #[tokio::test]
    async fn reply_failure_keeps_state() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/bot/message/reply");
                then.status(500);
            })
            .await;

        let state = state_for(&server.base_url(), Some(SECRET));
        let events: WebhookBody = serde_json::from_value(json!({
            "events": [text_event("U8", "r1", "hello")]
        }))
        .unwrap();

        process_events(state.clone(), events.events).await;

        let session = state.flow_runner.storage().get("U8").await.unwrap().unwrap();
        assert_eq!(session.step, Step::ProblemSelection);
    }

    #[tokio::test]
    async fn sweeper_evicts_idle_sessions() {
        let storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
        drop(storage.get_or_create("U1").await.unwrap());
        assert_eq!(storage.len(), 1);

        let handle = spawn_session_sweeper(
            storage.clone(),
            Duration::ZERO,
            Duration::from_millis(10),
        );
        for _ in 0..100 {
            if storage.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        assert!(storage.is_empty());
    }
}
