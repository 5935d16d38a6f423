use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReadingTest {
    pub id: Uuid,
    pub title: String,
    pub passage: String,
    pub difficulty_level: String,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "question_type", rename_all = "snake_case")]
pub enum QuestionType {
    Matching,
    TrueFalse,
    FillBlank,
    ShortAnswer,
}

/// A question belongs to exactly one reading test. Administrators may edit
/// questions at any time; results keep their own copy of the submitted
/// answer map, so past gradings are unaffected.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub test_id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub choices: Option<JsonValue>,
    pub correct_answer: String,
    pub sort_order: i32,
    pub points: i32,
}
