use crate::dto::auth_dto::{RegisterPayload, UpdateProfilePayload};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::crypto::{hash_password, verify_password};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub reading_tests_taken: i64,
    pub reading_avg_score: f64,
    pub listening_tests_taken: i64,
    pub listening_avg_score: f64,
    pub writing_tests_taken: i64,
    pub total_tests_taken: i64,
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        if payload.password != payload.password2 {
            return Err(Error::BadRequest("Passwords do not match".to_string()));
        }

        let existing = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM users WHERE email = $1 OR username = $2"#,
        )
        .bind(&payload.email)
        .bind(&payload.username)
        .fetch_one(&self.pool)
        .await?;
        if existing > 0 {
            return Err(Error::BadRequest(
                "A user with this email or username already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&payload.password)?;
        let target_band = payload
            .target_band_score
            .and_then(Decimal::from_f64_retain);

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (email, username, password_hash, first_name, last_name, country, target_band_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&payload.email)
        .bind(&payload.username)
        .bind(&password_hash)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.country)
        .bind(target_band)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users WHERE email = $1 AND is_active = TRUE"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(Error::Unauthorized("Invalid email or password".to_string()));
        }
        Ok(user)
    }

    pub async fn get_by_id(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        payload: UpdateProfilePayload,
    ) -> Result<User> {
        let target_band = payload
            .target_band_score
            .and_then(Decimal::from_f64_retain);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = COALESCE($1, username),
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                country = COALESCE($4, country),
                target_band_score = COALESCE($5, target_band_score),
                updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(payload.username)
        .bind(payload.first_name)
        .bind(payload.last_name)
        .bind(payload.country)
        .bind(target_band)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn user_stats(&self, user_id: Uuid) -> Result<UserStats> {
        let (reading_count, reading_avg) = sqlx::query_as::<_, (i64, Option<Decimal>)>(
            r#"SELECT COUNT(*), AVG(score) FROM test_results WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let (listening_count, listening_avg) = sqlx::query_as::<_, (i64, Option<Decimal>)>(
            r#"SELECT COUNT(*), AVG(score) FROM listening_results WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let writing_count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM writing_submissions WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserStats {
            reading_tests_taken: reading_count,
            reading_avg_score: reading_avg.and_then(|d| d.to_f64()).unwrap_or(0.0),
            listening_tests_taken: listening_count,
            listening_avg_score: listening_avg.and_then(|d| d.to_f64()).unwrap_or(0.0),
            writing_tests_taken: writing_count,
            total_tests_taken: reading_count + listening_count + writing_count,
        })
    }
}
