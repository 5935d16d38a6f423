use crate::error::{Error, Result};
use crate::models::writing::WritingTest;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Per-task assessment in the four IELTS criteria, scores on the 0-9 band
/// scale in half-band steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvaluation {
    pub score: f64,
    pub feedback: String,
    pub criteria: JsonValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingEvaluation {
    pub task1: TaskEvaluation,
    pub task2: TaskEvaluation,
    pub overall_band_score: f64,
}

#[derive(Clone)]
pub struct EvalService {
    client: Client,
    api_key: String,
}

impl EvalService {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }

    pub async fn evaluate_submission(
        &self,
        test: &WritingTest,
        task1_answer: &str,
        task2_answer: &str,
    ) -> Result<WritingEvaluation> {
        let system_prompt = r#"You are a certified IELTS Writing examiner.
Assess the candidate's two responses against the official band descriptors and
return a valid JSON object with this exact shape:

{
  "task1": {
    "score": 6.5,
    "feedback": "Concise overall feedback for task 1...",
    "criteria": {
      "task_achievement": 6.5,
      "coherence_cohesion": 6.0,
      "lexical_resource": 7.0,
      "grammatical_range": 6.5
    }
  },
  "task2": { same shape, with "task_response" instead of "task_achievement" },
  "overall_band_score": 6.5
}

Rules:
1. All scores are between 0.0 and 9.0 in half-band steps.
2. Weight task 2 double when computing overall_band_score, then round to the nearest half band.
3. Penalize responses that are off-topic, memorized or far below the word count.
4. Feedback must be specific and actionable, 3-5 sentences per task.
"#;

        let user_data = serde_json::json!({
            "task1_prompt": test.task1_image_description,
            "task1_type": test.task1_type,
            "task1_answer": task1_answer,
            "task2_prompt": test.task2_essay_prompt,
            "task2_type": test.task2_type,
            "task2_answer": task2_answer
        });

        let payload = serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": serde_json::to_string(&user_data)?}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.2
        });

        let resp = self.chat_openai(payload).await?;
        let evaluation: WritingEvaluation = serde_json::from_value(resp)?;

        if !band_in_range(evaluation.task1.score)
            || !band_in_range(evaluation.task2.score)
            || !band_in_range(evaluation.overall_band_score)
        {
            return Err(Error::Upstream(
                "Evaluation scores outside the 0-9 band range".to_string(),
            ));
        }

        tracing::info!(
            test_id = %test.id,
            task1 = evaluation.task1.score,
            task2 = evaluation.task2.score,
            overall = evaluation.overall_band_score,
            "Writing submission evaluated"
        );

        Ok(evaluation)
    }

    async fn chat_openai(&self, payload: JsonValue) -> Result<JsonValue> {
        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "OpenAI API Error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res.json().await?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .and_then(|s| serde_json::from_str(s).ok())
            .ok_or_else(|| Error::Upstream("Invalid OpenAI response format".to_string()))
    }
}

fn band_in_range(score: f64) -> bool {
    (0.0..=9.0).contains(&score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluation_parses_expected_shape() {
        let raw = serde_json::json!({
            "task1": {
                "score": 6.5,
                "feedback": "Covers the main trends but misses the overview.",
                "criteria": {
                    "task_achievement": 6.0,
                    "coherence_cohesion": 6.5,
                    "lexical_resource": 7.0,
                    "grammatical_range": 6.5
                }
            },
            "task2": {
                "score": 7.0,
                "feedback": "Clear position throughout with relevant examples.",
                "criteria": {
                    "task_response": 7.0,
                    "coherence_cohesion": 7.0,
                    "lexical_resource": 7.0,
                    "grammatical_range": 7.0
                }
            },
            "overall_band_score": 7.0
        });

        let evaluation: WritingEvaluation = serde_json::from_value(raw).unwrap();
        assert_eq!(evaluation.task1.score, 6.5);
        assert_eq!(evaluation.task2.score, 7.0);
        assert_eq!(evaluation.overall_band_score, 7.0);
    }

    #[test]
    fn band_range_check() {
        assert!(band_in_range(0.0));
        assert!(band_in_range(9.0));
        assert!(!band_in_range(9.5));
        assert!(!band_in_range(-1.0));
    }
}
