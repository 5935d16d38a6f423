use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::submission_dto::{SubmitTestRequest, SubmitTestResponse};
use crate::error::Json;
use crate::middleware::auth::Claims;
use crate::routes::claims_user_id;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_tests(
    State(state): State<AppState>,
) -> crate::error::Result<impl IntoResponse> {
    let tests = state.reading_service.list_active_tests().await?;
    Ok(Json(tests))
}

#[axum::debug_handler]
pub async fn get_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    let test = state.reading_service.get_active_test(test_id).await?;
    Ok(Json(test))
}

#[axum::debug_handler]
pub async fn submit_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<SubmitTestRequest>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims_user_id(&claims)?;
    let (result, summary) = state
        .reading_service
        .submit_test(test_id, user_id, payload)
        .await?;

    let response = SubmitTestResponse {
        message: "Test submitted successfully".to_string(),
        result_id: result.id,
        score: summary.score,
        total_questions: summary.total_questions,
        correct_answers: summary.correct_answers,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let results = state.reading_service.list_results(user_id).await?;
    Ok(Json(results))
}

#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(result_id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let detail = state
        .reading_service
        .get_result_detail(user_id, result_id)
        .await?;
    Ok(Json(detail))
}
