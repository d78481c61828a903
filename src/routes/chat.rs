use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::chat_dto::{ChatRoomListResponse, MessageListResponse, SendMessagePayload},
    dto::job_dto::JobResponse,
    error::Result,
    middleware::identity::Identity,
    AppState,
};

#[axum::debug_handler]
pub async fn list_chat_rooms(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<impl IntoResponse> {
    let rooms = state.chat_service.list_rooms_for_user(&identity.uid).await?;
    let items = rooms.into_iter().map(JobResponse::from).collect();
    Ok(Json(ChatRoomListResponse { items }))
}

#[axum::debug_handler]
pub async fn get_messages(
    State(state): State<AppState>,
    identity: Identity,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let items = state.chat_service.history(&identity.uid, job_id).await?;
    Ok(Json(MessageListResponse { items }))
}

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    identity: Identity,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let sender_name = if identity.display_name.is_empty() {
        "Unknown".to_string()
    } else {
        identity.display_name.clone()
    };
    let message = state
        .chat_service
        .send_message(&identity.uid, &sender_name, job_id, &payload.content)
        .await?;
    Ok(Json(message))
}

/// Snapshot-replace delivery: the full room log is pushed on subscribe and
/// again after every change. Closing the connection drops the subscription.
#[axum::debug_handler]
pub async fn stream_messages(
    State(state): State<AppState>,
    identity: Identity,
    Path(job_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let (initial, receiver) = state.chat_service.subscribe(&identity.uid, job_id).await?;

    let first = tokio_stream::once(Event::default().json_data(&initial));
    let updates = BroadcastStream::new(receiver).filter_map(|snapshot| {
        snapshot
            .ok()
            .map(|messages| Event::default().json_data(&messages))
    });

    Ok(Sse::new(first.chain(updates)).keep_alive(KeepAlive::default()))
}
