//! HTTP surface: liveness, the fetch-generate-dispatch trigger and status polling.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use podcast_status::StatusStore;
use serde::Serialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    types::SourcePost, x::PostSearcher, DispatchError, DispatchOutcome, Dispatcher, ScriptWriter,
};

pub struct AppState<S, W, D>
where
    S: PostSearcher + Send + Sync + 'static,
    W: ScriptWriter + Send + Sync + 'static,
    D: StatusStore + Send + Sync + 'static,
{
    pub dispatcher: Dispatcher<S, W>,
    pub store: D,
}

#[derive(Debug, Serialize)]
struct TweetsResponse {
    tweet: SourcePost,
    conversation: String,
    message: &'static str,
    status_key: String,
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

pub fn router<S, W, D>(state: Arc<AppState<S, W, D>>) -> Router
where
    S: PostSearcher + Send + Sync + 'static,
    W: ScriptWriter + Send + Sync + 'static,
    D: StatusStore + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/tweets", get(tweets::<S, W, D>))
        .route("/audio-status/{key}", get(audio_status::<S, W, D>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves until `shutdown` is cancelled
pub async fn serve<S, W, D>(
    addr: SocketAddr,
    state: Arc<AppState<S, W, D>>,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    S: PostSearcher + Send + Sync + 'static,
    W: ScriptWriter + Send + Sync + 'static,
    D: StatusStore + Send + Sync + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn index() -> &'static str {
    "Hello from podcast-pulse!"
}

async fn tweets<S, W, D>(State(state): State<Arc<AppState<S, W, D>>>) -> Response
where
    S: PostSearcher + Send + Sync + 'static,
    W: ScriptWriter + Send + Sync + 'static,
    D: StatusStore + Send + Sync + 'static,
{
    match state.dispatcher.dispatch().await {
        Ok(DispatchOutcome::Dispatched {
            post,
            script,
            status_key,
        }) => Json(TweetsResponse {
            tweet: post,
            conversation: script.text,
            message: "Audio generation started in background",
            status_key,
        })
        .into_response(),
        Ok(DispatchOutcome::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No tweets found" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn audio_status<S, W, D>(
    State(state): State<Arc<AppState<S, W, D>>>,
    Path(key): Path<String>,
) -> Response
where
    S: PostSearcher + Send + Sync + 'static,
    W: ScriptWriter + Send + Sync + 'static,
    D: StatusStore + Send + Sync + 'static,
{
    match state.store.read(&key).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "not_found" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = ?e, %key, "Failed to read status record");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
