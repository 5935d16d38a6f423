use crate::models::listening::ListeningQuestionType;
use crate::models::reading::QuestionType;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Raw submission body. Keys of `answers` are question ids rendered as text;
/// values are the learner's raw answer text. The map is taken wholesale from
/// the client and is not validated per question type.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitTestRequest {
    pub answers: HashMap<String, String>,
    pub time_taken: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitListeningRequest {
    pub answers: HashMap<String, String>,
    pub time_taken: Option<i64>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitWritingRequest {
    #[validate(length(min = 1, message = "Task 1 answer cannot be empty"))]
    pub task1_answer: String,
    #[validate(length(min = 1, message = "Task 2 answer cannot be empty"))]
    pub task2_answer: String,
    pub task1_time_taken: Option<i64>,
    pub task2_time_taken: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitTestResponse {
    pub message: String,
    pub result_id: Uuid,
    pub score: f64,
    pub total_questions: i32,
    pub correct_answers: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultSummary {
    pub id: Uuid,
    pub test_id: Uuid,
    pub test_title: String,
    pub score: f64,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub time_taken_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingAnswerDetail {
    pub question_id: Uuid,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListeningAnswerDetail {
    pub section_number: i32,
    pub question_id: Uuid,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: ListeningQuestionType,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingResultDetail {
    #[serde(flatten)]
    pub summary: ResultSummary,
    pub answers: JsonValue,
    pub answers_detail: Vec<ReadingAnswerDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListeningResultDetail {
    #[serde(flatten)]
    pub summary: ResultSummary,
    pub answers: JsonValue,
    pub answers_detail: Vec<ListeningAnswerDetail>,
}
