use anyhow::{Context, Result};
use std::env;

#[derive(Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_model: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub app_url: String,
    pub pdf_renderer_url: String,
    pub pdf_renderer_token: Option<String>,
    pub rate_limit_per_minute: u32,
    pub rate_limit_burst: u32,
}

impl AppConfig {
    /// Load configuration from the environment. Mandatory keys fail startup,
    /// matching the original deployment where a missing secret crashed the
    /// function cold-start instead of serving misconfigured requests.
    pub fn from_env() -> Result<Self> {
        Ok(AppConfig {
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
            supabase_url: required("VITE_SUPABASE_URL")?,
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            app_url: required("VITE_APP_URL")?,
            pdf_renderer_url: env::var("PDF_RENDERER_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            pdf_renderer_token: env::var("PDF_RENDERER_TOKEN").ok(),
            rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            rate_limit_burst: env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("missing required environment variable {}", key))
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            openai_api_key: String::new(),
            openai_model: "gpt-4o".to_string(),
            stripe_secret_key: String::new(),
            stripe_webhook_secret: String::new(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_role_key: String::new(),
            app_url: "http://localhost:5173".to_string(),
            pdf_renderer_url: "http://localhost:3001".to_string(),
            pdf_renderer_token: None,
            rate_limit_per_minute: 60,
            rate_limit_burst: 10,
        }
    }
}
