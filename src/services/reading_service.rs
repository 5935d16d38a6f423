use crate::dto::submission_dto::{
    ReadingAnswerDetail, ReadingResultDetail, ResultSummary, SubmitTestRequest,
};
use crate::dto::test_dto::{
    CreateReadingTestPayload, ReadingTestDetail, ReadingTestSummary, UpdateReadingTestPayload,
};
use crate::error::Result;
use crate::models::reading::{Question, ReadingTest};
use crate::models::result::TestResult;
use crate::services::grading_service::{GradeSummary, GradingService};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct ResultRow {
    id: Uuid,
    test_id: Uuid,
    test_title: String,
    score: Decimal,
    total_questions: i32,
    correct_answers: i32,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    time_taken_seconds: Option<i64>,
}

impl From<ResultRow> for ResultSummary {
    fn from(row: ResultRow) -> Self {
        Self {
            id: row.id,
            test_id: row.test_id,
            test_title: row.test_title,
            score: row.score.to_f64().unwrap_or(0.0),
            total_questions: row.total_questions,
            correct_answers: row.correct_answers,
            started_at: row.started_at,
            completed_at: row.completed_at,
            time_taken_seconds: row.time_taken_seconds,
            mode: None,
        }
    }
}

#[derive(Clone)]
pub struct ReadingService {
    pool: PgPool,
}

impl ReadingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_active_tests(&self) -> Result<Vec<ReadingTestSummary>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, DateTime<Utc>, i64)>(
            r#"
            SELECT t.id, t.title, t.difficulty_level, t.created_at, COUNT(q.id)
            FROM reading_tests t
            LEFT JOIN questions q ON q.test_id = t.id
            WHERE t.is_active = TRUE
            GROUP BY t.id
            ORDER BY t.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, title, difficulty_level, created_at, question_count)| ReadingTestSummary {
                    id,
                    title,
                    difficulty_level,
                    created_at,
                    question_count,
                },
            )
            .collect())
    }

    pub async fn get_active_test(&self, test_id: Uuid) -> Result<ReadingTestDetail> {
        let (test, questions) = self.load_active_test(test_id).await?;
        Ok(ReadingTestDetail::new(test, questions))
    }

    async fn load_active_test(&self, test_id: Uuid) -> Result<(ReadingTest, Vec<Question>)> {
        let test = sqlx::query_as::<_, ReadingTest>(
            r#"SELECT * FROM reading_tests WHERE id = $1 AND is_active = TRUE"#,
        )
        .bind(test_id)
        .fetch_one(&self.pool)
        .await?;

        let questions = self.questions_for_test(test.id).await?;
        Ok((test, questions))
    }

    async fn questions_for_test(&self, test_id: Uuid) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"SELECT * FROM questions WHERE test_id = $1 ORDER BY sort_order"#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    /// Grades a submission and persists exactly one result row. The test and
    /// its questions are never mutated; resubmission creates an independent
    /// result with an identical score. The returned summary carries the
    /// unrounded score; the stored column is limited to two decimal places.
    pub async fn submit_test(
        &self,
        test_id: Uuid,
        user_id: Uuid,
        req: SubmitTestRequest,
    ) -> Result<(TestResult, GradeSummary)> {
        let (test, questions) = self.load_active_test(test_id).await?;

        let summary = GradingService::grade(
            questions
                .iter()
                .map(|q| (q.id, q.correct_answer.as_str())),
            &req.answers,
        );

        let score = Decimal::from_f64_retain(summary.score).unwrap_or_default();
        let answers_json = serde_json::to_value(&req.answers)?;

        let result = sqlx::query_as::<_, TestResult>(
            r#"
            INSERT INTO test_results
                (user_id, test_id, score, total_questions, correct_answers, answers, completed_at, time_taken_seconds)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(test.id)
        .bind(score)
        .bind(summary.total_questions)
        .bind(summary.correct_answers)
        .bind(answers_json)
        .bind(req.time_taken)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            result_id = %result.id,
            test_id = %test.id,
            correct = summary.correct_answers,
            total = summary.total_questions,
            score = summary.score,
            "Reading submission graded"
        );

        Ok((result, summary))
    }

    pub async fn list_results(&self, user_id: Uuid) -> Result<Vec<ResultSummary>> {
        let rows = sqlx::query_as::<_, ResultRow>(
            r#"
            SELECT r.id, r.test_id, t.title AS test_title, r.score,
                   r.total_questions, r.correct_answers,
                   r.started_at, r.completed_at, r.time_taken_seconds
            FROM test_results r
            JOIN reading_tests t ON t.id = r.test_id
            WHERE r.user_id = $1
            ORDER BY r.completed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ResultSummary::from).collect())
    }

    pub async fn get_result_detail(
        &self,
        user_id: Uuid,
        result_id: Uuid,
    ) -> Result<ReadingResultDetail> {
        let result = sqlx::query_as::<_, TestResult>(
            r#"SELECT * FROM test_results WHERE id = $1 AND user_id = $2"#,
        )
        .bind(result_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let title = sqlx::query_scalar::<_, String>(r#"SELECT title FROM reading_tests WHERE id = $1"#)
            .bind(result.test_id)
            .fetch_one(&self.pool)
            .await?;

        let questions = self.questions_for_test(result.test_id).await?;
        let answers: HashMap<String, String> =
            serde_json::from_value(result.answers.clone()).unwrap_or_default();

        let answers_detail = questions
            .into_iter()
            .map(|q| {
                let user_answer = answers
                    .get(&q.id.to_string())
                    .cloned()
                    .unwrap_or_default();
                let is_correct = GradingService::is_match(&user_answer, &q.correct_answer);
                ReadingAnswerDetail {
                    question_id: q.id,
                    question_text: q.question_text,
                    question_type: q.question_type,
                    user_answer,
                    correct_answer: q.correct_answer,
                    is_correct,
                    points: q.points,
                }
            })
            .collect();

        Ok(ReadingResultDetail {
            summary: ResultSummary {
                id: result.id,
                test_id: result.test_id,
                test_title: title,
                score: result.score.to_f64().unwrap_or(0.0),
                total_questions: result.total_questions,
                correct_answers: result.correct_answers,
                started_at: result.started_at,
                completed_at: result.completed_at,
                time_taken_seconds: result.time_taken_seconds,
                mode: None,
            },
            answers: result.answers,
            answers_detail,
        })
    }

    pub async fn create_test(
        &self,
        payload: CreateReadingTestPayload,
        created_by: Uuid,
    ) -> Result<ReadingTest> {
        let mut tx = self.pool.begin().await?;

        let test = sqlx::query_as::<_, ReadingTest>(
            r#"
            INSERT INTO reading_tests (title, passage, difficulty_level, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.passage)
        .bind(payload.difficulty_level.as_deref().unwrap_or("medium"))
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        for (idx, q) in payload.questions.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO questions
                    (test_id, question_text, question_type, choices, correct_answer, sort_order, points)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(test.id)
            .bind(&q.question_text)
            .bind(q.question_type)
            .bind(&q.choices)
            .bind(&q.correct_answer)
            .bind((idx as i32) + 1)
            .bind(q.points)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(test)
    }

    pub async fn update_test(
        &self,
        test_id: Uuid,
        payload: UpdateReadingTestPayload,
    ) -> Result<ReadingTest> {
        let mut tx = self.pool.begin().await?;

        let test = sqlx::query_as::<_, ReadingTest>(
            r#"
            UPDATE reading_tests
            SET title = COALESCE($1, title),
                passage = COALESCE($2, passage),
                difficulty_level = COALESCE($3, difficulty_level),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(payload.title)
        .bind(payload.passage)
        .bind(payload.difficulty_level)
        .bind(payload.is_active)
        .bind(test_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(questions) = payload.questions {
            sqlx::query(r#"DELETE FROM questions WHERE test_id = $1"#)
                .bind(test.id)
                .execute(&mut *tx)
                .await?;

            for (idx, q) in questions.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO questions
                        (test_id, question_text, question_type, choices, correct_answer, sort_order, points)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(test.id)
                .bind(&q.question_text)
                .bind(q.question_type)
                .bind(&q.choices)
                .bind(&q.correct_answer)
                .bind((idx as i32) + 1)
                .bind(q.points)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(test)
    }

    pub async fn delete_test(&self, test_id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM reading_tests WHERE id = $1"#)
            .bind(test_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
