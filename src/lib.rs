pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    ai_service::AIService, eval_service::EvalService, listening_service::ListeningService,
    reading_service::ReadingService, user_service::UserService, writing_service::WritingService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub reading_service: ReadingService,
    pub listening_service: ListeningService,
    pub writing_service: WritingService,
    pub ai_service: AIService,
    pub eval_service: EvalService,
}

impl AppState {
    pub fn new(pool: PgPool) -> crate::error::Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        let user_service = UserService::new(pool.clone());
        let reading_service = ReadingService::new(pool.clone());
        let listening_service = ListeningService::new(pool.clone());
        let writing_service = WritingService::new(pool.clone());
        let ai_service = AIService::new(config.openai_api_key.clone(), http_client.clone());
        let eval_service = EvalService::new(config.openai_api_key.clone(), http_client);

        Ok(Self {
            pool,
            user_service,
            reading_service,
            listening_service,
            writing_service,
            ai_service,
            eval_service,
        })
    }
}
