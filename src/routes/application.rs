use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::application_dto::{
        AcceptedStatusResponse, ApplicationListResponse, ApplicationResponse, ApplyPayload,
        DecisionPayload, DecisionResponse,
    },
    error::{Error, Result},
    middleware::identity::Identity,
    AppState,
};

#[axum::debug_handler]
pub async fn apply_for_job(
    State(state): State<AppState>,
    identity: Identity,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    if payload.profile.uid != identity.uid {
        return Err(Error::Forbidden(
            "profile snapshot does not match the caller".to_string(),
        ));
    }
    let application = state
        .matching_service
        .apply_for_job(job_id, payload.profile)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from(application)),
    ))
}

#[axum::debug_handler]
pub async fn list_applications_for_job(
    State(state): State<AppState>,
    identity: Identity,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let applications = state
        .matching_service
        .applications_for_job(job_id, &identity.uid)
        .await?;
    let items = applications
        .into_iter()
        .map(ApplicationResponse::from)
        .collect();
    Ok(Json(ApplicationListResponse { items }))
}

#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<impl IntoResponse> {
    let applications = state
        .matching_service
        .applications_for_worker(&identity.uid)
        .await?;
    let items = applications
        .into_iter()
        .map(ApplicationResponse::from)
        .collect();
    Ok(Json(ApplicationListResponse { items }))
}

#[axum::debug_handler]
pub async fn accepted_status(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<impl IntoResponse> {
    let has_accepted = state
        .matching_service
        .has_accepted_application(&identity.uid)
        .await?;
    Ok(Json(AcceptedStatusResponse { has_accepted }))
}

#[axum::debug_handler]
pub async fn decide_application(
    State(state): State<AppState>,
    identity: Identity,
    Path(app_id): Path<Uuid>,
    Json(payload): Json<DecisionPayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .matching_service
        .decide_application(app_id, &identity.uid, payload.decision)
        .await?;
    Ok(Json(DecisionResponse {
        id: application.id,
        status: application.status,
    }))
}
