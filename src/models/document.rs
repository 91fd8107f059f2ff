use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Open key/value record describing a business. Validation against a document
/// type's required-field list happens in `prompts`, not at deserialization.
pub type ClientDetails = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentRequest {
    // Both kept optional so the handler can answer with the original's
    // "Missing required fields" message instead of a deserializer error.
    pub document_type: Option<String>,
    pub client_details: Option<ClientDetails>,
    #[serde(default)]
    pub custom_requirements: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_plan: PlanType,
    #[serde(default = "default_streaming")]
    pub streaming: bool,
}

fn default_streaming() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Starter,
    Pro,
    Enterprise,
}

impl Default for PlanType {
    fn default() -> Self {
        PlanType::Starter
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanType::Starter => write!(f, "starter"),
            PlanType::Pro => write!(f, "pro"),
            PlanType::Enterprise => write!(f, "enterprise"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    pub success: bool,
    pub document: String,
    pub document_type: String,
    pub generated_at: DateTime<Utc>,
    pub metadata: GenerationMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub user_id: Option<String>,
    pub user_plan: PlanType,
    pub rate_limit_remaining: Option<i64>,
}

/// Row inserted into the Supabase `documents` table for each generation.
/// Columns are snake_case, owned by the external schema.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub user_id: String,
    pub document_type: String,
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(user_id: &str, document_type: &str) -> Self {
        DocumentRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            document_type: document_type.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadPdfRequest {
    pub html: Option<String>,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String {
    "document".to_string()
}
