use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension};
use validator::Validate;

use crate::dto::auth_dto::{
    LoginPayload, RefreshPayload, RegisterPayload, UpdateProfilePayload, UserProfile,
};
use crate::error::Json;
use crate::middleware::auth::Claims;
use crate::routes::claims_user_id;
use crate::utils::token::{decode_refresh_token, issue_token_pair};
use crate::AppState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(UserProfile::from(user))))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .authenticate(&payload.email, &payload.password)
        .await?;
    let tokens = issue_token_pair(&user)?;
    Ok(Json(tokens))
}

#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> crate::error::Result<impl IntoResponse> {
    let claims = decode_refresh_token(&payload.refresh)?;
    let user_id = claims_user_id(&claims)?;
    let user = state.user_service.get_by_id(user_id).await?;
    let tokens = issue_token_pair(&user)?;
    Ok(Json(tokens))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let user = state.user_service.get_by_id(user_id).await?;
    Ok(Json(UserProfile::from(user)))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfilePayload>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims_user_id(&claims)?;
    let user = state.user_service.update_profile(user_id, payload).await?;
    Ok(Json(UserProfile::from(user)))
}
