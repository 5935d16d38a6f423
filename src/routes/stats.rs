use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};

use crate::middleware::auth::Claims;
use crate::routes::claims_user_id;
use crate::AppState;

#[axum::debug_handler]
pub async fn user_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let stats = state.user_service.user_stats(user_id).await?;
    Ok(Json(stats))
}
