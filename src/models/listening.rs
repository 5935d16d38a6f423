use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ListeningTest {
    pub id: Uuid,
    pub title: String,
    pub difficulty_level: String,
    pub total_duration_minutes: i32,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ListeningSection {
    pub id: Uuid,
    pub test_id: Uuid,
    pub section_number: i32,
    pub title: String,
    pub audio_url: Option<String>,
    pub transcript: String,
    pub instructions: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "listening_question_type", rename_all = "snake_case")]
pub enum ListeningQuestionType {
    Radio,
    Dropdown,
    Text,
    MultiChoice,
    Labeling,
    Completion,
    SentenceCompletion,
    ShortAnswer,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ListeningQuestion {
    pub id: Uuid,
    pub section_id: Uuid,
    pub question_text: String,
    pub question_type: ListeningQuestionType,
    pub choices: Option<JsonValue>,
    pub correct_answer: String,
    pub sort_order: i32,
    pub points: i32,
    pub image_url: Option<String>,
    pub additional_data: Option<JsonValue>,
}
