use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WritingTest {
    pub id: Uuid,
    pub title: String,
    pub difficulty_level: String,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub task1_image: Option<String>,
    pub task1_image_description: Option<String>,
    pub task1_type: String,
    pub task2_essay_prompt: String,
    pub task2_type: String,
    pub task1_time_limit_minutes: i32,
    pub task2_time_limit_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Score fields stay NULL until the AI evaluation succeeds; a failed
/// evaluation still persists the learner's answers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WritingSubmission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub task1_answer: String,
    pub task2_answer: String,
    pub task1_score: Option<rust_decimal::Decimal>,
    pub task1_feedback: Option<String>,
    pub task1_criteria: Option<JsonValue>,
    pub task2_score: Option<rust_decimal::Decimal>,
    pub task2_feedback: Option<String>,
    pub task2_criteria: Option<JsonValue>,
    pub overall_band_score: Option<rust_decimal::Decimal>,
    pub submitted_at: DateTime<Utc>,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub task1_time_seconds: Option<i64>,
    pub task2_time_seconds: Option<i64>,
}
