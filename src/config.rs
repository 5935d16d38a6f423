use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub openai_api_key: String,
    pub api_rps: u32,
    pub max_ai_questions: usize,
    pub access_token_hours: i64,
    pub refresh_token_hours: i64,
    pub media_dir: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            openai_api_key: get_env("OPENAI_API_KEY")?,
            api_rps: get_env_parse("API_RPS")?,
            max_ai_questions: get_env_parse("MAX_AI_QUESTIONS")?,
            access_token_hours: env::var("ACCESS_TOKEN_HOURS")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .map_err(|e| Error::Config(format!("Invalid ACCESS_TOKEN_HOURS: {}", e)))?
                .unwrap_or(12),
            refresh_token_hours: env::var("REFRESH_TOKEN_HOURS")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .map_err(|e| Error::Config(format!("Invalid REFRESH_TOKEN_HOURS: {}", e)))?
                .unwrap_or(24 * 7),
            media_dir: env::var("MEDIA_DIR").unwrap_or_else(|_| "media".to_string()),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
