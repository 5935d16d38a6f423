use crate::config::get_config;
use crate::dto::test_dto::{
    CreateListeningQuestionPayload, CreateListeningSectionPayload, CreateListeningTestPayload,
    CreateQuestionPayload, CreateReadingTestPayload, CreateWritingTestPayload,
};
use crate::error::{Error, Result};
use crate::models::listening::ListeningQuestionType;
use crate::models::reading::QuestionType;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use uuid::Uuid;

#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: String,
}

impl AIService {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }

    pub async fn generate_reading_test(
        &self,
        difficulty: &str,
    ) -> Result<CreateReadingTestPayload> {
        let max_questions = get_config().max_ai_questions;

        let system_prompt = r#"You are an experienced IELTS Academic Reading examiner.
Generate a complete IELTS reading practice test as a valid JSON object.

Rules:
1. Write an academic passage of 700-900 words on a factual topic.
2. Generate the requested number of questions drawn from the passage.
3. Mix question types: 'matching', 'true_false', 'fill_blank', 'short_answer'.
4. Every correct_answer must be a short string a candidate could type exactly.
5. For 'true_false' the correct_answer is one of "True", "False", "Not Given".
6. For typed answers keep correct_answer to at most three words.
"#;

        let user_schema = serde_json::json!({
            "difficulty_level": difficulty,
            "required_count": max_questions,
            "schema_example": {
                "title": "The History of Navigation",
                "passage": "Full passage text...",
                "questions": [
                    {
                        "type": "true_false",
                        "question_text": "Statement to judge...",
                        "choices": ["True", "False", "Not Given"],
                        "correct_answer": "True"
                    },
                    {
                        "type": "fill_blank",
                        "question_text": "Sailors relied on the ____ to find north.",
                        "correct_answer": "compass"
                    }
                ]
            }
        });

        let payload = serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": serde_json::to_string(&user_schema)?}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.8
        });

        let resp = self.chat_openai(payload).await?;

        let title = resp
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("Generated Reading Test")
            .to_string();
        let passage = resp
            .get("passage")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Upstream("Generated test is missing a passage".to_string()))?;

        let mut questions = sanitize_reading_questions(&resp);
        questions.truncate(max_questions);
        if questions.is_empty() {
            return Err(Error::Upstream(
                "Generated test contained no usable questions".to_string(),
            ));
        }

        tracing::info!(
            count = questions.len(),
            difficulty = %difficulty,
            "Generated reading test"
        );

        Ok(CreateReadingTestPayload {
            title,
            passage,
            difficulty_level: Some(difficulty.to_string()),
            questions,
        })
    }

    pub async fn generate_listening_test(
        &self,
        difficulty: &str,
        include_audio: bool,
    ) -> Result<CreateListeningTestPayload> {
        let system_prompt = r#"You are an experienced IELTS Listening examiner.
Generate a complete IELTS listening practice test as a valid JSON object.

Rules:
1. Produce exactly 2 sections. Section 1 is an everyday conversation, section 2 is an academic monologue.
2. Each section needs a natural spoken transcript of 250-400 words.
3. Each section needs 5 questions answerable from its transcript.
4. Question types: 'radio', 'dropdown', 'text', 'multi_choice', 'completion', 'sentence_completion', 'short_answer'.
5. Every correct_answer must be a short string found in or implied by the transcript.
"#;

        let user_schema = serde_json::json!({
            "difficulty_level": difficulty,
            "schema_example": {
                "title": "City Library Orientation",
                "sections": [
                    {
                        "section_number": 1,
                        "title": "Library membership enquiry",
                        "transcript": "Spoken dialogue text...",
                        "instructions": "Questions 1-5. Answer with NO MORE THAN TWO WORDS.",
                        "questions": [
                            {
                                "type": "text",
                                "question_text": "What time does the library open on Saturdays?",
                                "correct_answer": "9 am"
                            }
                        ]
                    }
                ]
            }
        });

        let payload = serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": serde_json::to_string(&user_schema)?}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.8
        });

        let resp = self.chat_openai(payload).await?;

        let title = resp
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("Generated Listening Test")
            .to_string();

        let raw_sections = resp
            .get("sections")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut sections = Vec::with_capacity(raw_sections.len());
        for (idx, raw) in raw_sections.iter().enumerate() {
            let transcript = raw
                .get("transcript")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            if transcript.is_empty() {
                continue;
            }

            let questions = sanitize_listening_questions(raw);
            if questions.is_empty() {
                continue;
            }

            let audio_url = if include_audio {
                match self.synthesize_speech(&transcript).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        tracing::error!("Speech synthesis failed for section {}: {:?}", idx + 1, e);
                        None
                    }
                }
            } else {
                None
            };

            sections.push(CreateListeningSectionPayload {
                section_number: raw
                    .get("section_number")
                    .and_then(|v| v.as_i64())
                    .map(|n| n as i32)
                    .unwrap_or((idx as i32) + 1),
                title: raw
                    .get("title")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Section")
                    .to_string(),
                audio_url,
                transcript,
                instructions: raw
                    .get("instructions")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
                questions,
            });
        }

        if sections.is_empty() {
            return Err(Error::Upstream(
                "Generated test contained no usable sections".to_string(),
            ));
        }

        tracing::info!(
            sections = sections.len(),
            difficulty = %difficulty,
            "Generated listening test"
        );

        Ok(CreateListeningTestPayload {
            title,
            difficulty_level: Some(difficulty.to_string()),
            total_duration_minutes: Some(30),
            sections,
        })
    }

    pub async fn generate_writing_test(
        &self,
        difficulty: &str,
        include_image: bool,
    ) -> Result<CreateWritingTestPayload> {
        let system_prompt = r#"You are an experienced IELTS Academic Writing examiner.
Generate an IELTS writing practice test as a valid JSON object.

Rules:
1. Task 1 describes visual data: provide 'task1_type' (graph, chart, table, diagram, map or process)
   and 'task1_image_description', a precise description of the visual an illustrator could draw.
2. Task 2 is an essay: provide 'task2_essay_prompt' and 'task2_type'
   (opinion, discussion, problem_solution or advantages_disadvantages).
3. Provide a short 'title' for the test.
"#;

        let user_schema = serde_json::json!({
            "difficulty_level": difficulty,
            "schema_example": {
                "title": "Urban Transport Trends",
                "task1_type": "graph",
                "task1_image_description": "A line graph showing bicycle commuting rates in four cities from 2000 to 2020...",
                "task2_essay_prompt": "Some people believe that...",
                "task2_type": "opinion"
            }
        });

        let payload = serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": serde_json::to_string(&user_schema)?}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.8
        });

        let resp = self.chat_openai(payload).await?;

        let task2_essay_prompt = resp
            .get("task2_essay_prompt")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                Error::Upstream("Generated test is missing the task 2 prompt".to_string())
            })?;
        let task1_image_description = resp
            .get("task1_image_description")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let task1_image = if include_image {
            match &task1_image_description {
                Some(description) => match self.generate_image(description).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        tracing::error!("Task 1 image generation failed: {:?}", e);
                        None
                    }
                },
                None => None,
            }
        } else {
            None
        };

        Ok(CreateWritingTestPayload {
            title: resp
                .get("title")
                .and_then(|v| v.as_str())
                .unwrap_or("Generated Writing Test")
                .to_string(),
            difficulty_level: Some(difficulty.to_string()),
            task1_image,
            task1_image_description,
            task1_type: resp
                .get("task1_type")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            task2_essay_prompt,
            task2_type: resp
                .get("task2_type")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            task1_time_limit_minutes: None,
            task2_time_limit_minutes: None,
        })
    }

    /// Renders a transcript to MP3 with the TTS API and stores it under the
    /// media directory. Returns the public URL path.
    pub async fn synthesize_speech(&self, text: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": "tts-1",
            "voice": "alloy",
            "input": text
        });

        let res = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("OpenAI TTS Error {}: {}", status, text)));
        }

        let bytes = res.bytes().await?;
        let file_name = format!("{}.mp3", Uuid::new_v4());
        self.store_media("listening_audios", &file_name, &bytes)
            .await?;
        Ok(format!("/media/listening_audios/{}", file_name))
    }

    /// Generates a task 1 visual with the image API, downloads it and stores
    /// it under the media directory. Returns the public URL path.
    async fn generate_image(&self, description: &str) -> Result<String> {
        let prompt = format!(
            "A clean, professional IELTS exam illustration with clearly labeled axes and legible data. {}",
            description
        );
        let payload = serde_json::json!({
            "model": "dall-e-3",
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024"
        });

        let res = self
            .client
            .post("https://api.openai.com/v1/images/generations")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "OpenAI image Error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res.json().await?;
        let remote_url = body
            .get("data")
            .and_then(|d| d.get(0))
            .and_then(|d| d.get("url"))
            .and_then(|u| u.as_str())
            .ok_or_else(|| Error::Upstream("Invalid image API response format".to_string()))?;

        let image = self.client.get(remote_url).send().await?.bytes().await?;
        let file_name = format!("{}.png", Uuid::new_v4());
        self.store_media("writing_images", &file_name, &image)
            .await?;
        Ok(format!("/media/writing_images/{}", file_name))
    }

    async fn store_media(&self, subdir: &str, file_name: &str, bytes: &[u8]) -> Result<()> {
        let dir = Path::new(&get_config().media_dir).join(subdir);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(file_name), bytes).await?;
        Ok(())
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

fn sanitize_reading_questions(raw: &JsonValue) -> Vec<CreateQuestionPayload> {
    let arr = raw
        .get("questions")
        .and_then(|a| a.as_array())
        .cloned()
        .unwrap_or_default();

    arr.iter()
        .filter_map(|v| {
            let question_text = v.get("question_text").and_then(|s| s.as_str())?.to_string();
            let correct_answer = v.get("correct_answer").and_then(|s| s.as_str())?.to_string();
            if question_text.is_empty() || correct_answer.is_empty() {
                return None;
            }
            let question_type = match v.get("type").and_then(|s| s.as_str()).unwrap_or("") {
                "matching" => QuestionType::Matching,
                "true_false" => QuestionType::TrueFalse,
                "fill_blank" => QuestionType::FillBlank,
                _ => QuestionType::ShortAnswer,
            };
            Some(CreateQuestionPayload {
                question_text,
                question_type,
                choices: v.get("choices").filter(|c| c.is_array()).cloned(),
                correct_answer,
                points: 1,
            })
        })
        .collect()
}

fn sanitize_listening_questions(section: &JsonValue) -> Vec<CreateListeningQuestionPayload> {
    let arr = section
        .get("questions")
        .and_then(|a| a.as_array())
        .cloned()
        .unwrap_or_default();

    arr.iter()
        .filter_map(|v| {
            let question_text = v.get("question_text").and_then(|s| s.as_str())?.to_string();
            let correct_answer = v.get("correct_answer").and_then(|s| s.as_str())?.to_string();
            if question_text.is_empty() || correct_answer.is_empty() {
                return None;
            }
            let question_type = match v.get("type").and_then(|s| s.as_str()).unwrap_or("") {
                "radio" => ListeningQuestionType::Radio,
                "dropdown" => ListeningQuestionType::Dropdown,
                "multi_choice" => ListeningQuestionType::MultiChoice,
                "labeling" => ListeningQuestionType::Labeling,
                "completion" => ListeningQuestionType::Completion,
                "sentence_completion" => ListeningQuestionType::SentenceCompletion,
                "short_answer" => ListeningQuestionType::ShortAnswer,
                _ => ListeningQuestionType::Text,
            };
            Some(CreateListeningQuestionPayload {
                question_text,
                question_type,
                choices: v.get("choices").filter(|c| c.is_array()).cloned(),
                correct_answer,
                points: 1,
                image_url: None,
                additional_data: v.get("additional_data").cloned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_reading_keeps_only_complete_questions() {
        let raw = serde_json::json!({
            "questions": [
                {"type": "true_false", "question_text": "The sky is blue.", "correct_answer": "True"},
                {"type": "fill_blank", "question_text": "Missing answer here"},
                {"type": "short_answer", "correct_answer": "orphan answer"},
                {"type": "unknown_kind", "question_text": "Falls back to short answer?", "correct_answer": "yes"}
            ]
        });

        let questions = sanitize_reading_questions(&raw);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question_type, QuestionType::TrueFalse);
        assert_eq!(questions[1].question_type, QuestionType::ShortAnswer);
    }

    #[test]
    fn sanitize_listening_maps_question_types() {
        let section = serde_json::json!({
            "questions": [
                {"type": "radio", "question_text": "Pick one", "choices": ["a", "b"], "correct_answer": "a"},
                {"type": "sentence_completion", "question_text": "Finish the sentence", "correct_answer": "library"},
                {"type": "", "question_text": "Defaults to text", "correct_answer": "ok"}
            ]
        });

        let questions = sanitize_listening_questions(&section);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].question_type, ListeningQuestionType::Radio);
        assert_eq!(
            questions[1].question_type,
            ListeningQuestionType::SentenceCompletion
        );
        assert_eq!(questions[2].question_type, ListeningQuestionType::Text);
    }
}
