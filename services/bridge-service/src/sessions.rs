use axum::{
    Json,
    extract::{Path, State},
};
use sb_api_types::DisconnectResponse;
use sb_store::SessionRecord;
use serde::Serialize;
use tracing::info;

use crate::{ApiResult, AppState, bad_request, internal_error, not_found};

#[derive(Debug, Serialize)]
pub(crate) struct SessionListResponse {
    pub(crate) sessions: Vec<SessionRecord>,
}

pub(crate) async fn list_sessions(State(state): State<AppState>) -> ApiResult<SessionListResponse> {
    let sessions = state.core.sessions().await.map_err(internal_error)?;
    Ok(Json(SessionListResponse { sessions }))
}

pub(crate) async fn disconnect_session(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> ApiResult<DisconnectResponse> {
    if topic.trim().is_empty() {
        return Err(bad_request("topic is required"));
    }

    let existed = state
        .core
        .disconnect(&topic)
        .await
        .map_err(internal_error)?;

    if !existed {
        return Err(not_found("session not found"));
    }

    info!("session {} disconnected", topic);
    Ok(Json(DisconnectResponse { disconnected: true }))
}
