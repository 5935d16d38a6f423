use crate::dto::submission_dto::{
    ListeningAnswerDetail, ListeningResultDetail, ResultSummary, SubmitListeningRequest,
};
use crate::dto::test_dto::{
    CreateListeningTestPayload, ListeningSectionDetail, ListeningTestDetail, ListeningTestSummary,
    UpdateListeningTestPayload,
};
use crate::error::Result;
use crate::models::listening::{ListeningQuestion, ListeningSection, ListeningTest};
use crate::models::result::ListeningResult;
use crate::services::grading_service::{GradeSummary, GradingService};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct ListeningService {
    pool: PgPool,
}

impl ListeningService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_active_tests(&self) -> Result<Vec<ListeningTestSummary>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, i32, DateTime<Utc>, i64, i64)>(
            r#"
            SELECT t.id, t.title, t.difficulty_level, t.total_duration_minutes, t.created_at,
                   COUNT(DISTINCT s.id), COUNT(q.id)
            FROM listening_tests t
            LEFT JOIN listening_sections s ON s.test_id = t.id
            LEFT JOIN listening_questions q ON q.section_id = s.id
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
                |(
                    id,
                    title,
                    difficulty_level,
                    total_duration_minutes,
                    created_at,
                    section_count,
                    total_questions,
                )| ListeningTestSummary {
                    id,
                    title,
                    difficulty_level,
                    total_duration_minutes,
                    created_at,
                    section_count,
                    total_questions,
                },
            )
            .collect())
    }

    pub async fn get_active_test(&self, test_id: Uuid) -> Result<ListeningTestDetail> {
        let test = self.fetch_active_test(test_id).await?;
        let sections = self.sections_with_questions(test.id).await?;

        Ok(ListeningTestDetail {
            id: test.id,
            title: test.title,
            difficulty_level: test.difficulty_level,
            total_duration_minutes: test.total_duration_minutes,
            created_at: test.created_at,
            sections: sections
                .into_iter()
                .map(|(section, questions)| ListeningSectionDetail::new(section, questions))
                .collect(),
        })
    }

    async fn fetch_active_test(&self, test_id: Uuid) -> Result<ListeningTest> {
        let test = sqlx::query_as::<_, ListeningTest>(
            r#"SELECT * FROM listening_tests WHERE id = $1 AND is_active = TRUE"#,
        )
        .bind(test_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(test)
    }

    async fn sections_with_questions(
        &self,
        test_id: Uuid,
    ) -> Result<Vec<(ListeningSection, Vec<ListeningQuestion>)>> {
        let sections = sqlx::query_as::<_, ListeningSection>(
            r#"SELECT * FROM listening_sections WHERE test_id = $1 ORDER BY section_number"#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(sections.len());
        for section in sections {
            let questions = sqlx::query_as::<_, ListeningQuestion>(
                r#"SELECT * FROM listening_questions WHERE section_id = $1 ORDER BY sort_order"#,
            )
            .bind(section.id)
            .fetch_all(&self.pool)
            .await?;
            out.push((section, questions));
        }
        Ok(out)
    }

    /// Grades all questions across every section of the test and writes one
    /// listening result row. The returned summary carries the unrounded
    /// score; the stored column is limited to two decimal places.
    pub async fn submit_test(
        &self,
        test_id: Uuid,
        user_id: Uuid,
        req: SubmitListeningRequest,
    ) -> Result<(ListeningResult, GradeSummary)> {
        let test = self.fetch_active_test(test_id).await?;
        let sections = self.sections_with_questions(test.id).await?;

        let summary = GradingService::grade(
            sections
                .iter()
                .flat_map(|(_, questions)| questions.iter())
                .map(|q| (q.id, q.correct_answer.as_str())),
            &req.answers,
        );

        let score = Decimal::from_f64_retain(summary.score).unwrap_or_default();
        let answers_json = serde_json::to_value(&req.answers)?;
        let mode = req.mode.as_deref().unwrap_or("exam");

        let result = sqlx::query_as::<_, ListeningResult>(
            r#"
            INSERT INTO listening_results
                (user_id, test_id, score, total_questions, correct_answers, answers, mode, completed_at, time_taken_seconds)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(test.id)
        .bind(score)
        .bind(summary.total_questions)
        .bind(summary.correct_answers)
        .bind(answers_json)
        .bind(mode)
        .bind(req.time_taken)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            result_id = %result.id,
            test_id = %test.id,
            correct = summary.correct_answers,
            total = summary.total_questions,
            score = summary.score,
            mode = %result.mode,
            "Listening submission graded"
        );

        Ok((result, summary))
    }

    pub async fn list_results(&self, user_id: Uuid) -> Result<Vec<ResultSummary>> {
        let results = sqlx::query_as::<_, ListeningResult>(
            r#"
            SELECT * FROM listening_results
            WHERE user_id = $1
            ORDER BY completed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut summaries = Vec::with_capacity(results.len());
        for result in results {
            let title =
                sqlx::query_scalar::<_, String>(r#"SELECT title FROM listening_tests WHERE id = $1"#)
                    .bind(result.test_id)
                    .fetch_one(&self.pool)
                    .await?;
            summaries.push(Self::summarize(result, title));
        }
        Ok(summaries)
    }

    pub async fn get_result_detail(
        &self,
        user_id: Uuid,
        result_id: Uuid,
    ) -> Result<ListeningResultDetail> {
        let result = sqlx::query_as::<_, ListeningResult>(
            r#"SELECT * FROM listening_results WHERE id = $1 AND user_id = $2"#,
        )
        .bind(result_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let title =
            sqlx::query_scalar::<_, String>(r#"SELECT title FROM listening_tests WHERE id = $1"#)
                .bind(result.test_id)
                .fetch_one(&self.pool)
                .await?;

        let sections = self.sections_with_questions(result.test_id).await?;
        let answers: HashMap<String, String> =
            serde_json::from_value(result.answers.clone()).unwrap_or_default();

        let answers_detail = answer_details(sections, &answers);

        let answers_json = result.answers.clone();
        Ok(ListeningResultDetail {
            summary: Self::summarize(result, title),
            answers: answers_json,
            answers_detail,
        })
    }

    fn summarize(result: ListeningResult, title: String) -> ResultSummary {
        ResultSummary {
            id: result.id,
            test_id: result.test_id,
            test_title: title,
            score: result.score.to_f64().unwrap_or(0.0),
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            started_at: result.started_at,
            completed_at: result.completed_at,
            time_taken_seconds: result.time_taken_seconds,
            mode: Some(result.mode),
        }
    }

    pub async fn create_test(
        &self,
        payload: CreateListeningTestPayload,
        created_by: Uuid,
    ) -> Result<ListeningTest> {
        let mut tx = self.pool.begin().await?;

        let test = sqlx::query_as::<_, ListeningTest>(
            r#"
            INSERT INTO listening_tests (title, difficulty_level, total_duration_minutes, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payload.title)
        .bind(payload.difficulty_level.as_deref().unwrap_or("medium"))
        .bind(payload.total_duration_minutes.unwrap_or(30))
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        for section in &payload.sections {
            let section_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO listening_sections
                    (test_id, section_number, title, audio_url, transcript, instructions)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                "#,
            )
            .bind(test.id)
            .bind(section.section_number)
            .bind(&section.title)
            .bind(&section.audio_url)
            .bind(&section.transcript)
            .bind(section.instructions.as_deref().unwrap_or(""))
            .fetch_one(&mut *tx)
            .await?;

            for (idx, q) in section.questions.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO listening_questions
                        (section_id, question_text, question_type, choices, correct_answer,
                         sort_order, points, image_url, additional_data)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    "#,
                )
                .bind(section_id)
                .bind(&q.question_text)
                .bind(q.question_type)
                .bind(&q.choices)
                .bind(&q.correct_answer)
                .bind((idx as i32) + 1)
                .bind(q.points)
                .bind(&q.image_url)
                .bind(&q.additional_data)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(test)
    }

    pub async fn update_test(
        &self,
        test_id: Uuid,
        payload: UpdateListeningTestPayload,
    ) -> Result<ListeningTest> {
        let test = sqlx::query_as::<_, ListeningTest>(
            r#"
            UPDATE listening_tests
            SET title = COALESCE($1, title),
                difficulty_level = COALESCE($2, difficulty_level),
                total_duration_minutes = COALESCE($3, total_duration_minutes),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(payload.title)
        .bind(payload.difficulty_level)
        .bind(payload.total_duration_minutes)
        .bind(payload.is_active)
        .bind(test_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(test)
    }

    pub async fn delete_test(&self, test_id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM listening_tests WHERE id = $1"#)
            .bind(test_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn answer_details(
    sections: Vec<(ListeningSection, Vec<ListeningQuestion>)>,
    answers: &HashMap<String, String>,
) -> Vec<ListeningAnswerDetail> {
    let mut details = Vec::new();
    for (section, questions) in sections {
        for q in questions {
            let user_answer = answers
                .get(&q.id.to_string())
                .cloned()
                .unwrap_or_default();
            let is_correct = GradingService::is_match(&user_answer, &q.correct_answer);
            details.push(ListeningAnswerDetail {
                section_number: section.section_number,
                question_id: q.id,
                question_text: q.question_text,
                question_type: q.question_type,
                user_answer,
                correct_answer: q.correct_answer,
                is_correct,
                points: q.points,
            });
        }
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::listening::ListeningQuestionType;
    use chrono::Utc;

    fn section(number: i32, test_id: Uuid) -> ListeningSection {
        ListeningSection {
            id: Uuid::new_v4(),
            test_id,
            section_number: number,
            title: format!("Section {}", number),
            audio_url: None,
            transcript: "transcript".to_string(),
            instructions: String::new(),
            created_at: Utc::now(),
        }
    }

    fn question(section_id: Uuid, order: i32, answer: &str) -> ListeningQuestion {
        ListeningQuestion {
            id: Uuid::new_v4(),
            section_id,
            question_text: format!("Question {}", order),
            question_type: ListeningQuestionType::Text,
            choices: None,
            correct_answer: answer.to_string(),
            sort_order: order,
            points: 1,
            image_url: None,
            additional_data: None,
        }
    }

    #[test]
    fn answer_details_span_sections_and_compare_normalized() {
        let test_id = Uuid::new_v4();
        let s1 = section(1, test_id);
        let s2 = section(2, test_id);
        let q1 = question(s1.id, 1, "9 am");
        let q2 = question(s2.id, 1, "library");
        let q3 = question(s2.id, 2, "Monday");

        let mut answers = HashMap::new();
        answers.insert(q1.id.to_string(), " 9 AM ".to_string());
        answers.insert(q3.id.to_string(), "tuesday".to_string());

        let details = answer_details(vec![(s1, vec![q1]), (s2, vec![q2, q3])], &answers);

        assert_eq!(details.len(), 3);
        assert_eq!(details[0].section_number, 1);
        assert!(details[0].is_correct);
        assert_eq!(details[1].section_number, 2);
        assert!(!details[1].is_correct);
        assert_eq!(details[1].user_answer, "");
        assert!(!details[2].is_correct);
    }
}
