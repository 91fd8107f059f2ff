use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::{DocumentRecord, PlanType};
use crate::supabase::SupabaseClient;

/// Documents per calendar month on the starter plan. Pro and enterprise
/// plans are unlimited.
pub const STARTER_MONTHLY_LIMIT: u32 = 100;

pub fn monthly_quota(plan: PlanType) -> Option<u32> {
    match plan {
        PlanType::Starter => Some(STARTER_MONTHLY_LIMIT),
        PlanType::Pro | PlanType::Enterprise => None,
    }
}

/// Quota state for one user. `remaining == -1` means unlimited.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub remaining: i64,
    pub reset_time: DateTime<Utc>,
    pub plan_type: PlanType,
}

impl RateLimitInfo {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// First instant of the next calendar month, when monthly quotas reset.
pub fn next_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .expect("first of month is a valid instant")
}

pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .expect("first of month is a valid instant")
}

fn month_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// Persistence behind the monthly quota check.
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn monthly_usage(&self, user_id: &str) -> anyhow::Result<u32>;
    async fn record_generation(&self, user_id: &str, document_type: &str) -> anyhow::Result<()>;
}

/// In-process store keyed by user and month. Usage resets implicitly when
/// the month key rolls over; counts do not survive a restart.
#[derive(Default)]
pub struct MemoryUsageStore {
    counts: Mutex<HashMap<(String, String), u32>>,
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn monthly_usage(&self, user_id: &str) -> anyhow::Result<u32> {
        let key = (user_id.to_string(), month_key(Utc::now()));
        let counts = self.counts.lock().expect("usage lock");
        Ok(counts.get(&key).copied().unwrap_or(0))
    }

    async fn record_generation(&self, user_id: &str, _document_type: &str) -> anyhow::Result<()> {
        let key = (user_id.to_string(), month_key(Utc::now()));
        let mut counts = self.counts.lock().expect("usage lock");
        *counts.entry(key).or_insert(0) += 1;
        Ok(())
    }
}

/// Store backed by the Supabase `documents` table: each generation inserts a
/// row, and usage is the row count for the current calendar month.
pub struct SupabaseUsageStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseUsageStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        SupabaseUsageStore { supabase }
    }
}

#[async_trait]
impl UsageStore for SupabaseUsageStore {
    async fn monthly_usage(&self, user_id: &str) -> anyhow::Result<u32> {
        let count = self
            .supabase
            .count_documents_since(user_id, month_start(Utc::now()))
            .await?;
        Ok(count)
    }

    async fn record_generation(&self, user_id: &str, document_type: &str) -> anyhow::Result<()> {
        self.supabase
            .insert_document(&DocumentRecord::new(user_id, document_type))
            .await?;
        Ok(())
    }
}

/// Compute the quota state for a user. Usage-store failures are logged and
/// treated as zero usage so a broken lookup cannot lock paying users out.
pub async fn check_rate_limit(
    store: &dyn UsageStore,
    user_id: &str,
    plan: PlanType,
) -> RateLimitInfo {
    let now = Utc::now();
    let remaining = match monthly_quota(plan) {
        None => -1,
        Some(limit) => {
            let used = match store.monthly_usage(user_id).await {
                Ok(used) => used,
                Err(err) => {
                    tracing::warn!(error = %err, user_id, "usage lookup failed, treating usage as 0");
                    0
                }
            };
            i64::from(limit).saturating_sub(i64::from(used)).max(0)
        }
    };

    RateLimitInfo {
        remaining,
        reset_time: next_reset(now),
        plan_type: plan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_table_matches_plans() {
        assert_eq!(monthly_quota(PlanType::Starter), Some(100));
        assert_eq!(monthly_quota(PlanType::Pro), None);
        assert_eq!(monthly_quota(PlanType::Enterprise), None);
    }

    #[test]
    fn reset_rolls_into_next_month() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 9, 30, 0).unwrap();
        assert_eq!(next_reset(now), Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn reset_rolls_over_december() {
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(next_reset(now), Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn memory_store_counts_generations() {
        let store = MemoryUsageStore::default();
        assert_eq!(store.monthly_usage("user-1").await.unwrap(), 0);

        store.record_generation("user-1", "terms-of-service").await.unwrap();
        store.record_generation("user-1", "privacy-policy").await.unwrap();
        store.record_generation("user-2", "terms-of-service").await.unwrap();

        assert_eq!(store.monthly_usage("user-1").await.unwrap(), 2);
        assert_eq!(store.monthly_usage("user-2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn starter_plan_decrements_remaining() {
        let store = MemoryUsageStore::default();
        store.record_generation("user-1", "terms-of-service").await.unwrap();

        let info = check_rate_limit(&store, "user-1", PlanType::Starter).await;
        assert_eq!(info.remaining, i64::from(STARTER_MONTHLY_LIMIT) - 1);
        assert!(!info.is_exhausted());
    }

    #[tokio::test]
    async fn pro_plan_is_unlimited() {
        let store = MemoryUsageStore::default();
        let info = check_rate_limit(&store, "user-1", PlanType::Pro).await;
        assert_eq!(info.remaining, -1);
        assert!(!info.is_exhausted());
    }

    #[tokio::test]
    async fn exhausted_starter_plan_reports_zero() {
        let store = MemoryUsageStore::default();
        for _ in 0..STARTER_MONTHLY_LIMIT {
            store.record_generation("user-1", "terms-of-service").await.unwrap();
        }
        let info = check_rate_limit(&store, "user-1", PlanType::Starter).await;
        assert_eq!(info.remaining, 0);
        assert!(info.is_exhausted());
    }
}
