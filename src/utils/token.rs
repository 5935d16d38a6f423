use crate::config::get_config;
use crate::dto::auth_dto::TokenResponse;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

fn build_claims(user: &User, token_type: &str, hours: i64) -> Claims {
    let exp = Utc::now() + Duration::hours(hours);
    Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        is_staff: user.is_staff,
        token_type: token_type.to_string(),
        exp: exp.timestamp() as usize,
    }
}

fn sign(claims: &Claims) -> Result<String> {
    let config = get_config();
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token signing failed: {}", e)))
}

/// Issues an access/refresh pair for a freshly authenticated user.
pub fn issue_token_pair(user: &User) -> Result<TokenResponse> {
    let config = get_config();
    let access = sign(&build_claims(user, "access", config.access_token_hours))?;
    let refresh = sign(&build_claims(user, "refresh", config.refresh_token_hours))?;

    Ok(TokenResponse {
        access,
        refresh,
        token_type: "Bearer".to_string(),
        expires_in: config.access_token_hours * 3600,
    })
}

/// Validates a refresh token and returns its claims. Access tokens are
/// rejected here so they cannot be replayed for refresh.
pub fn decode_refresh_token(token: &str) -> Result<Claims> {
    let config = get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| Error::Unauthorized("Invalid refresh token".to_string()))?;

    if data.claims.token_type != "refresh" {
        return Err(Error::Unauthorized("Invalid refresh token".to_string()));
    }
    Ok(data.claims)
}
