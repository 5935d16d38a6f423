use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::submission_dto::SubmitWritingRequest;
use crate::error::Json;
use crate::middleware::auth::Claims;
use crate::routes::claims_user_id;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_tests(
    State(state): State<AppState>,
) -> crate::error::Result<impl IntoResponse> {
    let tests = state.writing_service.list_active_tests().await?;
    Ok(Json(tests))
}

#[axum::debug_handler]
pub async fn get_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    let test = state.writing_service.get_active_test(test_id).await?;
    Ok(Json(test))
}

#[axum::debug_handler]
pub async fn submit_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<SubmitWritingRequest>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims_user_id(&claims)?;
    let submission = state
        .writing_service
        .submit_test(test_id, user_id, payload, &state.eval_service)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

#[axum::debug_handler]
pub async fn list_submissions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let submissions = state.writing_service.list_submissions(user_id).await?;
    Ok(Json(submissions))
}

#[axum::debug_handler]
pub async fn get_submission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(submission_id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let submission = state
        .writing_service
        .get_submission(user_id, submission_id)
        .await?;
    Ok(Json(submission))
}
