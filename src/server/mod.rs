//! HTTP control surface: trigger endpoints, feed CRUD and the status stream.
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::Stream;
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use crate::domain::model::{Feed, FeedDraft, StatusMessage, TriggerMessage};
use crate::ports::repo::FeedRepo;

#[derive(Clone)]
pub struct ServerState {
    pub triggers: mpsc::Sender<TriggerMessage>,
    pub status: broadcast::Sender<StatusMessage>,
    pub repo: Arc<dyn FeedRepo>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/refresh", post(trigger_refresh))
        .route("/api/feeds", get(list_feeds).post(add_feed))
        .route("/api/feeds/{id}", delete(delete_feed))
        .route("/api/events", get(events))
        .with_state(state)
}

async fn trigger_refresh(
    State(state): State<ServerState>,
) -> Result<StatusCode, (StatusCode, String)> {
    enqueue(&state, TriggerMessage::PageRefresh).await?;
    Ok(StatusCode::ACCEPTED)
}

async fn add_feed(
    State(state): State<ServerState>,
    Json(draft): Json<FeedDraft>,
) -> Result<StatusCode, (StatusCode, String)> {
    if draft.url.is_empty() || draft.css_selector.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "url and cssSelector are required".to_string(),
        ));
    }
    enqueue(&state, TriggerMessage::AddFeed { payload: draft }).await?;
    Ok(StatusCode::ACCEPTED)
}

async fn list_feeds(
    State(state): State<ServerState>,
) -> Result<Json<Vec<Feed>>, (StatusCode, String)> {
    state
        .repo
        .get_all()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e))
}

async fn delete_feed(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .repo
        .delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e))
}

/// Status messages as server-sent events, one JSON payload per event.
async fn events(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.status.subscribe();
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(msg) => match Event::default().json_data(&msg) {
                    Ok(event) => yield Ok(event),
                    Err(e) => warn!(error = %e, "failed to encode status event"),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "status listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn enqueue(
    state: &ServerState,
    msg: TriggerMessage,
) -> Result<(), (StatusCode, String)> {
    state.triggers.send(msg).await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("trigger queue closed: {e}"),
        )
    })
}
