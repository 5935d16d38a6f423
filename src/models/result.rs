use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// One row per submission attempt. Append-only: never updated after the
/// grading pipeline writes it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub score: rust_decimal::Decimal,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub answers: JsonValue,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_taken_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ListeningResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub score: rust_decimal::Decimal,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub answers: JsonValue,
    pub mode: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_taken_seconds: Option<i64>,
}
