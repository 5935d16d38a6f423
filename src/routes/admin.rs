use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::test_dto::{
    CreateListeningTestPayload, CreateReadingTestPayload, CreateWritingTestPayload,
    GenerateListeningTestPayload, GenerateReadingTestPayload, GenerateWritingTestPayload,
    UpdateListeningTestPayload, UpdateReadingTestPayload, UpdateWritingTestPayload,
};
use crate::error::{Error, Json};
use crate::middleware::auth::Claims;
use crate::routes::claims_user_id;
use crate::AppState;

// Reading test management.

#[axum::debug_handler]
pub async fn create_reading_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateReadingTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims_user_id(&claims)?;
    let test = state.reading_service.create_test(payload, user_id).await?;
    Ok((StatusCode::CREATED, Json(test)))
}

#[axum::debug_handler]
pub async fn update_reading_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<UpdateReadingTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let test = state.reading_service.update_test(test_id, payload).await?;
    Ok(Json(test))
}

#[axum::debug_handler]
pub async fn delete_reading_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    if !state.reading_service.delete_test(test_id).await? {
        return Err(Error::NotFound("Test not found".to_string()));
    }
    Ok(Json(json!({"message": "Test deleted"})))
}

// Listening test management.

#[axum::debug_handler]
pub async fn create_listening_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateListeningTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims_user_id(&claims)?;
    let test = state
        .listening_service
        .create_test(payload, user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(test)))
}

#[axum::debug_handler]
pub async fn update_listening_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<UpdateListeningTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let test = state
        .listening_service
        .update_test(test_id, payload)
        .await?;
    Ok(Json(test))
}

#[axum::debug_handler]
pub async fn delete_listening_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    if !state.listening_service.delete_test(test_id).await? {
        return Err(Error::NotFound("Test not found".to_string()));
    }
    Ok(Json(json!({"message": "Test deleted"})))
}

// Writing test management.

#[axum::debug_handler]
pub async fn create_writing_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateWritingTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims_user_id(&claims)?;
    let test = state.writing_service.create_test(payload, user_id).await?;
    Ok((StatusCode::CREATED, Json(test)))
}

#[axum::debug_handler]
pub async fn update_writing_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<UpdateWritingTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let test = state.writing_service.update_test(test_id, payload).await?;
    Ok(Json(test))
}

#[axum::debug_handler]
pub async fn delete_writing_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    if !state.writing_service.delete_test(test_id).await? {
        return Err(Error::NotFound("Test not found".to_string()));
    }
    Ok(Json(json!({"message": "Test deleted"})))
}

// AI-assisted test authoring. The generated content is persisted immediately
// so admins can review and edit it through the regular update endpoints.

#[axum::debug_handler]
pub async fn generate_reading_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GenerateReadingTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let difficulty = payload.difficulty_level.as_deref().unwrap_or("medium");
    let generated = state.ai_service.generate_reading_test(difficulty).await?;
    let test = state
        .reading_service
        .create_test(generated, user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(test)))
}

#[axum::debug_handler]
pub async fn generate_listening_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GenerateListeningTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let difficulty = payload.difficulty_level.as_deref().unwrap_or("medium");
    let generated = state
        .ai_service
        .generate_listening_test(difficulty, payload.include_audio)
        .await?;
    let test = state
        .listening_service
        .create_test(generated, user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(test)))
}

#[axum::debug_handler]
pub async fn generate_writing_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GenerateWritingTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let difficulty = payload.difficulty_level.as_deref().unwrap_or("medium");
    let generated = state
        .ai_service
        .generate_writing_test(difficulty, payload.include_image)
        .await?;
    let test = state.writing_service.create_test(generated, user_id).await?;
    Ok((StatusCode::CREATED, Json(test)))
}
