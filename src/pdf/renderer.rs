use bytes::Bytes;
use serde_json::json;

use crate::core::{ServiceError, ServiceResult};

/// Client for the hosted headless-browser renderer that turns document HTML
/// into a PDF. The service never runs a browser itself; rendering is
/// delegated the same way generation is delegated to the LLM.
pub struct PdfRenderer {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl PdfRenderer {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        PdfRenderer {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Render HTML to PDF bytes: A4, backgrounds on, 20px margins.
    pub async fn render(&self, html: &str) -> ServiceResult<Bytes> {
        let body = json!({
            "html": html,
            "options": {
                "format": "A4",
                "printBackground": true,
                "margin": {
                    "top": "20px",
                    "right": "20px",
                    "bottom": "20px",
                    "left": "20px",
                },
            },
        });

        let mut request = self.http.post(format!("{}/pdf", self.base_url));
        if let Some(token) = &self.token {
            request = request.query(&[("token", token)]);
        }

        let resp = request
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::upstream("pdf renderer", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Upstream {
                service: "pdf renderer",
                message: format!("HTTP {}: {}", status, text),
            });
        }

        resp.bytes()
            .await
            .map_err(|e| ServiceError::upstream("pdf renderer", e))
    }
}
