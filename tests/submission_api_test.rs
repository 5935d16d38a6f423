use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

// Requires a running Postgres; skipped when DATABASE_URL is not set.
#[tokio::test]
async fn reading_submission_flow_end_to_end() {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("API_RPS", "100");
    env::set_var("MAX_AI_QUESTIONS", "10");

    ielts_backend::config::init_config().expect("init config");
    let pool = ielts_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let suffix = Uuid::new_v4();
    let user_service = ielts_backend::services::user_service::UserService::new(pool.clone());
    let user = user_service
        .register(ielts_backend::dto::auth_dto::RegisterPayload {
            email: format!("learner_{}@example.com", suffix),
            username: format!("learner_{}", suffix),
            password: "sup3rsecret".into(),
            password2: "sup3rsecret".into(),
            first_name: None,
            last_name: None,
            country: None,
            target_band_score: Some(7.0),
        })
        .await
        .expect("register user");

    // Duplicate usernames are rejected even under a different email.
    let duplicate = user_service
        .register(ielts_backend::dto::auth_dto::RegisterPayload {
            email: format!("other_{}@example.com", suffix),
            username: format!("learner_{}", suffix),
            password: "sup3rsecret".into(),
            password2: "sup3rsecret".into(),
            first_name: None,
            last_name: None,
            country: None,
            target_band_score: None,
        })
        .await;
    assert!(matches!(
        duplicate,
        Err(ielts_backend::error::Error::BadRequest(_))
    ));

    let reading_service =
        ielts_backend::services::reading_service::ReadingService::new(pool.clone());
    let question = |text: &str,
                    qtype: ielts_backend::models::reading::QuestionType,
                    answer: &str| {
        ielts_backend::dto::test_dto::CreateQuestionPayload {
            question_text: text.into(),
            question_type: qtype,
            choices: None,
            correct_answer: answer.into(),
            points: 1,
        }
    };
    let test = reading_service
        .create_test(
            ielts_backend::dto::test_dto::CreateReadingTestPayload {
                title: "Sample Passage".into(),
                passage: "A passage about European capitals.".into(),
                difficulty_level: Some("medium".into()),
                questions: vec![
                    question(
                        "Which option matches paragraph 1?",
                        ielts_backend::models::reading::QuestionType::Matching,
                        "A",
                    ),
                    question(
                        "The passage claims the city is old.",
                        ielts_backend::models::reading::QuestionType::TrueFalse,
                        "True",
                    ),
                    question(
                        "In which year was the survey conducted?",
                        ielts_backend::models::reading::QuestionType::FillBlank,
                        "2020",
                    ),
                    question(
                        "Which capital is described?",
                        ielts_backend::models::reading::QuestionType::ShortAnswer,
                        "Paris",
                    ),
                ],
            },
            user.id,
        )
        .await
        .expect("create test");

    let tokens = ielts_backend::utils::token::issue_token_pair(&user).expect("tokens");
    let bearer = format!("Bearer {}", tokens.access);

    let app_state = ielts_backend::AppState::new(pool.clone()).expect("state");
    let app = Router::new()
        .route("/api/tests/:id", get(ielts_backend::routes::reading::get_test))
        .route(
            "/api/tests/:id/submit",
            post(ielts_backend::routes::reading::submit_test),
        )
        .route(
            "/api/results",
            get(ielts_backend::routes::reading::list_results),
        )
        .route(
            "/api/results/:id",
            get(ielts_backend::routes::reading::get_result),
        )
        .layer(axum::middleware::from_fn(
            ielts_backend::middleware::auth::require_auth,
        ))
        .with_state(app_state);

    // Unauthenticated requests are rejected.
    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/tests/{}", test.id))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The learner view carries questions in authored order, without answers.
    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/tests/{}", test.id))
        .header("authorization", &bearer)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let detail: JsonValue = serde_json::from_slice(&bytes).unwrap();
    let questions = detail["questions"].as_array().expect("questions");
    assert_eq!(questions.len(), 4);
    assert!(questions[0].get("correct_answer").is_none());
    let qid = |i: usize| questions[i]["id"].as_str().unwrap().to_string();

    // Three of four answers correct after normalization.
    let submit_body = json!({
        "answers": {
            qid(0): "a",
            qid(1): "TRUE",
            qid(2): "2021",
            qid(3): "paris"
        },
        "time_taken": 540
    });
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/tests/{}/submit", test.id))
        .header("authorization", &bearer)
        .header("content-type", "application/json")
        .body(Body::from(submit_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total_questions"], 4);
    assert_eq!(body["correct_answers"], 3);
    assert_eq!(body["score"].as_f64().unwrap(), 6.75);
    let first_result_id = body["result_id"].as_str().unwrap().to_string();

    // Resubmission appends a second result with the same score.
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/tests/{}/submit", test.id))
        .header("authorization", &bearer)
        .header("content-type", "application/json")
        .body(Body::from(submit_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_ne!(body["result_id"].as_str().unwrap(), first_result_id);
    assert_eq!(body["score"].as_f64().unwrap(), 6.75);

    // Both attempts show up in the learner's history.
    let req = Request::builder()
        .method("GET")
        .uri("/api/results")
        .header("authorization", &bearer)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let results: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(results.as_array().unwrap().len(), 2);

    // Result detail reports per-question correctness.
    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/results/{}", first_result_id))
        .header("authorization", &bearer)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let detail: JsonValue = serde_json::from_slice(&bytes).unwrap();
    let answers_detail = detail["answers_detail"].as_array().unwrap();
    assert_eq!(answers_detail.len(), 4);
    let correct_count = answers_detail
        .iter()
        .filter(|a| a["is_correct"].as_bool().unwrap())
        .count();
    assert_eq!(correct_count, 3);

    // A body without the answers map is a 400, not a 422.
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/tests/{}/submit", test.id))
        .header("authorization", &bearer)
        .header("content-type", "application/json")
        .body(Body::from(json!({"time_taken": 10}).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Responses report the exact band value even when the stored column
    // rounds it: 2 of 7 correct is 18/7, not 2.57.
    let seven = reading_service
        .create_test(
            ielts_backend::dto::test_dto::CreateReadingTestPayload {
                title: "Seven Questions".into(),
                passage: "A longer passage.".into(),
                difficulty_level: Some("medium".into()),
                questions: (1..=7)
                    .map(|i| {
                        question(
                            &format!("Question {}", i),
                            ielts_backend::models::reading::QuestionType::ShortAnswer,
                            &format!("answer{}", i),
                        )
                    })
                    .collect(),
            },
            user.id,
        )
        .await
        .expect("create seven question test");
    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/tests/{}", seven.id))
        .header("authorization", &bearer)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let detail: JsonValue = serde_json::from_slice(&bytes).unwrap();
    let seven_questions = detail["questions"].as_array().unwrap();
    let submit_body = json!({
        "answers": {
            seven_questions[0]["id"].as_str().unwrap(): "answer1",
            seven_questions[1]["id"].as_str().unwrap(): "answer2"
        }
    });
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/tests/{}/submit", seven.id))
        .header("authorization", &bearer)
        .header("content-type", "application/json")
        .body(Body::from(submit_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["correct_answers"], 2);
    assert_eq!(body["score"].as_f64().unwrap(), (2.0f64 / 7.0) * 9.0);

    // Unknown and inactive tests yield 404 on submit.
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/tests/{}/submit", Uuid::new_v4()))
        .header("authorization", &bearer)
        .header("content-type", "application/json")
        .body(Body::from(json!({"answers": {}}).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let deactivated = reading_service
        .update_test(
            test.id,
            ielts_backend::dto::test_dto::UpdateReadingTestPayload {
                title: None,
                passage: None,
                difficulty_level: None,
                is_active: Some(false),
                questions: None,
            },
        )
        .await
        .expect("deactivate");
    assert!(!deactivated.is_active);
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/tests/{}/submit", test.id))
        .header("authorization", &bearer)
        .header("content-type", "application/json")
        .body(Body::from(json!({"answers": {}}).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
