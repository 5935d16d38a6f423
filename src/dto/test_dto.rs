use crate::models::listening::{ListeningQuestion, ListeningQuestionType, ListeningSection};
use crate::models::reading::{Question, QuestionType, ReadingTest};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

// Learner-facing views never carry the correct answer.

#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub choices: Option<JsonValue>,
    pub order: i32,
    pub points: i32,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text,
            question_type: q.question_type,
            choices: q.choices,
            order: q.sort_order,
            points: q.points,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingTestSummary {
    pub id: Uuid,
    pub title: String,
    pub difficulty_level: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub question_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingTestDetail {
    pub id: Uuid,
    pub title: String,
    pub passage: String,
    pub difficulty_level: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub questions: Vec<PublicQuestion>,
}

impl ReadingTestDetail {
    pub fn new(test: ReadingTest, questions: Vec<Question>) -> Self {
        Self {
            id: test.id,
            title: test.title,
            passage: test.passage,
            difficulty_level: test.difficulty_level,
            created_at: test.created_at,
            questions: questions.into_iter().map(PublicQuestion::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicListeningQuestion {
    pub id: Uuid,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: ListeningQuestionType,
    pub choices: Option<JsonValue>,
    pub order: i32,
    pub points: i32,
    pub image_url: Option<String>,
    pub additional_data: Option<JsonValue>,
}

impl From<ListeningQuestion> for PublicListeningQuestion {
    fn from(q: ListeningQuestion) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text,
            question_type: q.question_type,
            choices: q.choices,
            order: q.sort_order,
            points: q.points,
            image_url: q.image_url,
            additional_data: q.additional_data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListeningSectionDetail {
    pub id: Uuid,
    pub section_number: i32,
    pub title: String,
    pub audio_url: Option<String>,
    pub instructions: String,
    pub questions: Vec<PublicListeningQuestion>,
}

impl ListeningSectionDetail {
    pub fn new(section: ListeningSection, questions: Vec<ListeningQuestion>) -> Self {
        Self {
            id: section.id,
            section_number: section.section_number,
            title: section.title,
            audio_url: section.audio_url,
            instructions: section.instructions,
            questions: questions
                .into_iter()
                .map(PublicListeningQuestion::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListeningTestSummary {
    pub id: Uuid,
    pub title: String,
    pub difficulty_level: String,
    pub total_duration_minutes: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub section_count: i64,
    pub total_questions: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListeningTestDetail {
    pub id: Uuid,
    pub title: String,
    pub difficulty_level: String,
    pub total_duration_minutes: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub sections: Vec<ListeningSectionDetail>,
}

// Admin authoring payloads. Question ordering is assigned from list position.

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionPayload {
    #[validate(length(min = 1, message = "Question text cannot be empty"))]
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub choices: Option<JsonValue>,
    #[validate(length(min = 1, message = "Correct answer cannot be empty"))]
    pub correct_answer: String,
    #[serde(default = "default_points")]
    pub points: i32,
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReadingTestPayload {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Passage cannot be empty"))]
    pub passage: String,
    pub difficulty_level: Option<String>,
    #[validate(nested)]
    pub questions: Vec<CreateQuestionPayload>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReadingTestPayload {
    pub title: Option<String>,
    pub passage: Option<String>,
    pub difficulty_level: Option<String>,
    pub is_active: Option<bool>,
    /// When present, replaces the entire question set.
    #[validate(nested)]
    pub questions: Option<Vec<CreateQuestionPayload>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateListeningQuestionPayload {
    #[validate(length(min = 1, message = "Question text cannot be empty"))]
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: ListeningQuestionType,
    pub choices: Option<JsonValue>,
    #[validate(length(min = 1, message = "Correct answer cannot be empty"))]
    pub correct_answer: String,
    #[serde(default = "default_points")]
    pub points: i32,
    pub image_url: Option<String>,
    pub additional_data: Option<JsonValue>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateListeningSectionPayload {
    #[validate(range(min = 1, message = "Section number must be positive"))]
    pub section_number: i32,
    #[validate(length(min = 1, message = "Section title cannot be empty"))]
    pub title: String,
    pub audio_url: Option<String>,
    pub transcript: String,
    pub instructions: Option<String>,
    #[validate(nested)]
    pub questions: Vec<CreateListeningQuestionPayload>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateListeningTestPayload {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    pub difficulty_level: Option<String>,
    pub total_duration_minutes: Option<i32>,
    #[validate(nested)]
    pub sections: Vec<CreateListeningSectionPayload>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateListeningTestPayload {
    pub title: Option<String>,
    pub difficulty_level: Option<String>,
    pub total_duration_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWritingTestPayload {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    pub difficulty_level: Option<String>,
    pub task1_image: Option<String>,
    pub task1_image_description: Option<String>,
    pub task1_type: Option<String>,
    #[validate(length(min = 1, message = "Task 2 prompt cannot be empty"))]
    pub task2_essay_prompt: String,
    pub task2_type: Option<String>,
    pub task1_time_limit_minutes: Option<i32>,
    pub task2_time_limit_minutes: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWritingTestPayload {
    pub title: Option<String>,
    pub difficulty_level: Option<String>,
    pub is_active: Option<bool>,
    pub task1_image: Option<String>,
    pub task1_image_description: Option<String>,
    pub task1_type: Option<String>,
    pub task2_essay_prompt: Option<String>,
    pub task2_type: Option<String>,
    pub task1_time_limit_minutes: Option<i32>,
    pub task2_time_limit_minutes: Option<i32>,
}

// AI generation payloads.

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateReadingTestPayload {
    pub difficulty_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateListeningTestPayload {
    pub difficulty_level: Option<String>,
    #[serde(default = "default_true")]
    pub include_audio: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateWritingTestPayload {
    pub difficulty_level: Option<String>,
    #[serde(default = "default_true")]
    pub include_image: bool,
}

fn default_true() -> bool {
    true
}
