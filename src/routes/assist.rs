use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::assist_dto::{
        DraftDescriptionPayload, DraftDescriptionResponse, ParseRequestPayload, SafetyTipsPayload,
        SafetyTipsResponse,
    },
    error::Result,
    AppState,
};

#[axum::debug_handler]
pub async fn draft_description(
    State(state): State<AppState>,
    Json(payload): Json<DraftDescriptionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let description = state
        .assist_service
        .draft_description(
            &payload.crop,
            &payload.task,
            &payload.pay,
            &payload.owner_name,
        )
        .await;
    Ok(Json(DraftDescriptionResponse { description }))
}

#[axum::debug_handler]
pub async fn safety_tips(
    State(state): State<AppState>,
    Json(payload): Json<SafetyTipsPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let tips = state.assist_service.safety_tips(&payload.task).await;
    Ok(Json(SafetyTipsResponse { tips }))
}

#[axum::debug_handler]
pub async fn parse_job_request(
    State(state): State<AppState>,
    Json(payload): Json<ParseRequestPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let fields = state.assist_service.parse_job_request(&payload.input).await;
    Ok(Json(fields))
}
