pub mod admin;
pub mod auth;
pub mod health;
pub mod listening;
pub mod reading;
pub mod stats;
pub mod writing;

use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use uuid::Uuid;

pub(crate) fn claims_user_id(claims: &Claims) -> Result<Uuid> {
    claims
        .sub
        .parse()
        .map_err(|_| Error::Unauthorized("Invalid token subject".to_string()))
}
