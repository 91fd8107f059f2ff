use governor::{clock::DefaultClock, state::keyed::DashMapStateStore, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::ai::{OpenAiClient, SupabaseUsageStore, UsageStore};
use crate::billing::StripeClient;
use crate::core::AppConfig;
use crate::pdf::PdfRenderer;
use crate::supabase::SupabaseClient;

pub type KeyedRateLimiter = Arc<RateLimiter<String, DashMapStateStore<String>, DefaultClock>>;

#[derive(Clone)]
pub struct ApiState {
    pub openai: Arc<OpenAiClient>,
    pub stripe: Arc<StripeClient>,
    pub supabase: Arc<SupabaseClient>,
    pub pdf: Arc<PdfRenderer>,
    pub usage: Arc<dyn UsageStore>,
    pub request_limiter: KeyedRateLimiter,
    pub config: Arc<AppConfig>,
}

impl ApiState {
    pub fn new(config: AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(
            &config.supabase_url,
            &config.supabase_service_role_key,
        ));
        let usage = Arc::new(SupabaseUsageStore::new(supabase.clone()));
        Self::build(config, supabase, usage)
    }

    /// State with a caller-supplied usage store; tests use the memory store.
    pub fn with_usage_store(config: AppConfig, usage: Arc<dyn UsageStore>) -> Self {
        let supabase = Arc::new(SupabaseClient::new(
            &config.supabase_url,
            &config.supabase_service_role_key,
        ));
        Self::build(config, supabase, usage)
    }

    fn build(config: AppConfig, supabase: Arc<SupabaseClient>, usage: Arc<dyn UsageStore>) -> Self {
        let openai = Arc::new(OpenAiClient::new(
            &config.openai_api_key,
            &config.openai_model,
        ));
        let stripe = Arc::new(StripeClient::new(&config.stripe_secret_key));
        let pdf = Arc::new(PdfRenderer::new(
            &config.pdf_renderer_url,
            config.pdf_renderer_token.clone(),
        ));

        let quota = Quota::per_minute(
            NonZeroU32::new(config.rate_limit_per_minute.max(1)).expect("nonzero quota"),
        )
        .allow_burst(NonZeroU32::new(config.rate_limit_burst.max(1)).expect("nonzero burst"));
        let request_limiter = Arc::new(RateLimiter::dashmap_with_clock(
            quota,
            &DefaultClock::default(),
        ));

        ApiState {
            openai,
            stripe,
            supabase,
            pdf,
            usage,
            request_limiter,
            config: Arc::new(config),
        }
    }
}
