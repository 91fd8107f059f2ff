pub mod client;
pub mod rate_limit;
pub mod sse;

pub use client::{ChatMessage, CompletionOptions, OpenAiClient};
pub use rate_limit::{
    check_rate_limit, monthly_quota, MemoryUsageStore, RateLimitInfo, SupabaseUsageStore,
    UsageStore,
};
pub use sse::relay_stream;
