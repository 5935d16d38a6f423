use crate::dto::submission_dto::SubmitWritingRequest;
use crate::dto::test_dto::{CreateWritingTestPayload, UpdateWritingTestPayload};
use crate::error::Result;
use crate::models::writing::{WritingSubmission, WritingTest};
use crate::services::eval_service::EvalService;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct WritingService {
    pool: PgPool,
}

impl WritingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_active_tests(&self) -> Result<Vec<WritingTest>> {
        let tests = sqlx::query_as::<_, WritingTest>(
            r#"SELECT * FROM writing_tests WHERE is_active = TRUE ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    pub async fn get_active_test(&self, test_id: Uuid) -> Result<WritingTest> {
        let test = sqlx::query_as::<_, WritingTest>(
            r#"SELECT * FROM writing_tests WHERE id = $1 AND is_active = TRUE"#,
        )
        .bind(test_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(test)
    }

    /// Persists the learner's answers, then runs the AI evaluation. If the
    /// evaluation fails the submission is still stored with NULL scores.
    pub async fn submit_test(
        &self,
        test_id: Uuid,
        user_id: Uuid,
        req: SubmitWritingRequest,
        eval_service: &EvalService,
    ) -> Result<WritingSubmission> {
        let test = self.get_active_test(test_id).await?;

        let submission = sqlx::query_as::<_, WritingSubmission>(
            r#"
            INSERT INTO writing_submissions
                (user_id, test_id, task1_answer, task2_answer, task1_time_seconds, task2_time_seconds)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(test.id)
        .bind(&req.task1_answer)
        .bind(&req.task2_answer)
        .bind(req.task1_time_taken)
        .bind(req.task2_time_taken)
        .fetch_one(&self.pool)
        .await?;

        match eval_service
            .evaluate_submission(&test, &req.task1_answer, &req.task2_answer)
            .await
        {
            Ok(evaluation) => {
                let updated = sqlx::query_as::<_, WritingSubmission>(
                    r#"
                    UPDATE writing_submissions
                    SET task1_score = $1, task1_feedback = $2, task1_criteria = $3,
                        task2_score = $4, task2_feedback = $5, task2_criteria = $6,
                        overall_band_score = $7, evaluated_at = NOW()
                    WHERE id = $8
                    RETURNING *
                    "#,
                )
                .bind(Decimal::from_f64_retain(evaluation.task1.score).unwrap_or_default())
                .bind(&evaluation.task1.feedback)
                .bind(&evaluation.task1.criteria)
                .bind(Decimal::from_f64_retain(evaluation.task2.score).unwrap_or_default())
                .bind(&evaluation.task2.feedback)
                .bind(&evaluation.task2.criteria)
                .bind(Decimal::from_f64_retain(evaluation.overall_band_score).unwrap_or_default())
                .bind(submission.id)
                .fetch_one(&self.pool)
                .await?;
                Ok(updated)
            }
            Err(e) => {
                tracing::error!(
                    submission_id = %submission.id,
                    "Writing evaluation failed, answers kept without scores: {:?}",
                    e
                );
                Ok(submission)
            }
        }
    }

    pub async fn list_submissions(&self, user_id: Uuid) -> Result<Vec<WritingSubmission>> {
        let submissions = sqlx::query_as::<_, WritingSubmission>(
            r#"
            SELECT * FROM writing_submissions
            WHERE user_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(submissions)
    }

    pub async fn get_submission(
        &self,
        user_id: Uuid,
        submission_id: Uuid,
    ) -> Result<WritingSubmission> {
        let submission = sqlx::query_as::<_, WritingSubmission>(
            r#"SELECT * FROM writing_submissions WHERE id = $1 AND user_id = $2"#,
        )
        .bind(submission_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(submission)
    }

    pub async fn create_test(
        &self,
        payload: CreateWritingTestPayload,
        created_by: Uuid,
    ) -> Result<WritingTest> {
        let test = sqlx::query_as::<_, WritingTest>(
            r#"
            INSERT INTO writing_tests
                (title, difficulty_level, created_by, task1_image, task1_image_description,
                 task1_type, task2_essay_prompt, task2_type,
                 task1_time_limit_minutes, task2_time_limit_minutes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&payload.title)
        .bind(payload.difficulty_level.as_deref().unwrap_or("medium"))
        .bind(created_by)
        .bind(&payload.task1_image)
        .bind(&payload.task1_image_description)
        .bind(payload.task1_type.as_deref().unwrap_or("graph"))
        .bind(&payload.task2_essay_prompt)
        .bind(payload.task2_type.as_deref().unwrap_or("opinion"))
        .bind(payload.task1_time_limit_minutes.unwrap_or(20))
        .bind(payload.task2_time_limit_minutes.unwrap_or(40))
        .fetch_one(&self.pool)
        .await?;
        Ok(test)
    }

    pub async fn update_test(
        &self,
        test_id: Uuid,
        payload: UpdateWritingTestPayload,
    ) -> Result<WritingTest> {
        let test = sqlx::query_as::<_, WritingTest>(
            r#"
            UPDATE writing_tests
            SET title = COALESCE($1, title),
                difficulty_level = COALESCE($2, difficulty_level),
                is_active = COALESCE($3, is_active),
                task1_image = COALESCE($4, task1_image),
                task1_image_description = COALESCE($5, task1_image_description),
                task1_type = COALESCE($6, task1_type),
                task2_essay_prompt = COALESCE($7, task2_essay_prompt),
                task2_type = COALESCE($8, task2_type),
                task1_time_limit_minutes = COALESCE($9, task1_time_limit_minutes),
                task2_time_limit_minutes = COALESCE($10, task2_time_limit_minutes),
                updated_at = NOW()
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(payload.title)
        .bind(payload.difficulty_level)
        .bind(payload.is_active)
        .bind(payload.task1_image)
        .bind(payload.task1_image_description)
        .bind(payload.task1_type)
        .bind(payload.task2_essay_prompt)
        .bind(payload.task2_type)
        .bind(payload.task1_time_limit_minutes)
        .bind(payload.task2_time_limit_minutes)
        .bind(test_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(test)
    }

    pub async fn delete_test(&self, test_id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM writing_tests WHERE id = $1"#)
            .bind(test_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
