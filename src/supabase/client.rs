use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;

use crate::core::{ServiceError, ServiceResult};
use crate::models::{AuthUser, DocumentRecord, Profile};

/// Client for Supabase's GoTrue auth and PostgREST endpoints. The service
/// authenticates with the service-role key; end users are only ever resolved
/// from the access tokens they submit.
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        SupabaseClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_role_key: service_role_key.into(),
        }
    }

    fn rest(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Resolve the user behind a client-submitted access token. Any auth
    /// failure maps to Unauthorized; callers never learn why a token was bad.
    pub async fn get_user(&self, access_token: &str) -> ServiceResult<AuthUser> {
        let resp = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.service_role_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ServiceError::upstream("supabase", e))?;

        if !resp.status().is_success() {
            return Err(ServiceError::Unauthorized);
        }

        resp.json().await.map_err(|_| ServiceError::Unauthorized)
    }

    pub async fn get_profile(&self, user_id: &str) -> ServiceResult<Profile> {
        let resp = self
            .http
            .get(format!("{}?id=eq.{}&select=*", self.rest("profiles"), user_id))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await
            .map_err(|e| ServiceError::upstream("supabase", e))?;

        let status = resp.status();
        if status.is_success() {
            resp.json()
                .await
                .map_err(|e| ServiceError::upstream("supabase", e))
        } else if status == reqwest::StatusCode::NOT_ACCEPTABLE {
            // PostgREST answers 406 when the single-object filter matches no row.
            Err(ServiceError::NotFound("Profile not found".to_string()))
        } else {
            Err(ServiceError::Upstream {
                service: "supabase",
                message: format!("profile lookup returned HTTP {}", status),
            })
        }
    }

    pub async fn update_profile(&self, user_id: &str, patch: &Value) -> ServiceResult<()> {
        let resp = self
            .http
            .patch(format!("{}?id=eq.{}", self.rest("profiles"), user_id))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await
            .map_err(|e| ServiceError::upstream("supabase", e))?;

        if !resp.status().is_success() {
            return Err(ServiceError::Upstream {
                service: "supabase",
                message: format!("profile update returned HTTP {}", resp.status()),
            });
        }
        Ok(())
    }

    pub async fn insert_document(&self, record: &DocumentRecord) -> ServiceResult<()> {
        let resp = self
            .http
            .post(self.rest("documents"))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(|e| ServiceError::upstream("supabase", e))?;

        if !resp.status().is_success() {
            return Err(ServiceError::Upstream {
                service: "supabase",
                message: format!("document insert returned HTTP {}", resp.status()),
            });
        }
        Ok(())
    }

    /// Count a user's `documents` rows created at or after `since`. Uses a
    /// zero-width range with `Prefer: count=exact` so only the count travels
    /// back, in the `content-range` header (`0-0/42`).
    pub async fn count_documents_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> ServiceResult<u32> {
        let url = format!(
            "{}?user_id=eq.{}&created_at=gte.{}&select=id",
            self.rest("documents"),
            user_id,
            since.to_rfc3339(),
        );
        let resp = self
            .http
            .get(url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await
            .map_err(|e| ServiceError::upstream("supabase", e))?;

        let status = resp.status();
        if !status.is_success() && status != reqwest::StatusCode::RANGE_NOT_SATISFIABLE {
            return Err(ServiceError::Upstream {
                service: "supabase",
                message: format!("document count returned HTTP {}", status),
            });
        }

        resp.headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|total| total.parse().ok())
            .ok_or_else(|| ServiceError::Upstream {
                service: "supabase",
                message: "missing count in content-range header".to_string(),
            })
    }

    /// Liveness probe against the auth health endpoint, used by `/ready`.
    pub async fn health(&self) -> bool {
        self.http
            .get(format!("{}/auth/v1/health", self.base_url))
            .header("apikey", &self.service_role_key)
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }
}
