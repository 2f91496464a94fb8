use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::enhance::AiProvider;
use crate::wizard::DEFAULT_TOTAL_STEPS;

/// Application configuration loaded from environment variables.
/// Startup fails if a set variable cannot be parsed; every variable has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub draft_dir: PathBuf,
    pub ai_provider: AiProvider,
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub render_sink_url: Option<String>,
    pub wizard_total_steps: u8,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let wizard_total_steps = std::env::var("WIZARD_TOTAL_STEPS")
            .unwrap_or_else(|_| DEFAULT_TOTAL_STEPS.to_string())
            .parse::<u8>()
            .context("WIZARD_TOTAL_STEPS must be a number between 1 and 255")?;
        if wizard_total_steps == 0 {
            bail!("WIZARD_TOTAL_STEPS must be at least 1");
        }

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            draft_dir: std::env::var("DRAFT_DIR")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),
            ai_provider: std::env::var("AI_PROVIDER")
                .unwrap_or_else(|_| "groq".to_string())
                .parse::<AiProvider>()
                .map_err(anyhow::Error::msg)
                .context("AI_PROVIDER is invalid")?,
            groq_api_key: optional_env("GROQ_API_KEY"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            render_sink_url: optional_env("RENDER_SINK_URL"),
            wizard_total_steps,
        })
    }

    /// API key for the configured provider, if any.
    pub fn ai_api_key(&self) -> Option<String> {
        match self.ai_provider {
            AiProvider::Groq => self.groq_api_key.clone(),
            AiProvider::OpenAi => self.openai_api_key.clone(),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
