use crate::models::user::User;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub password2: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    #[validate(range(min = 0.0, max = 9.0, message = "Target band must be between 0 and 9"))]
    pub target_band_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshPayload {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    #[validate(range(min = 0.0, max = 9.0, message = "Target band must be between 0 and 9"))]
    pub target_band_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: uuid::Uuid,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    pub target_band_score: Option<f64>,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            country: user.country,
            target_band_score: user.target_band_score.and_then(|d| d.to_f64()),
            is_staff: user.is_staff,
            is_active: user.is_active,
            date_joined: user.date_joined,
        }
    }
}
