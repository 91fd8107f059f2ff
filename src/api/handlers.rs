use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use once_cell::sync::Lazy;
use prometheus::IntCounterVec;
use serde::Deserialize;
use serde_json::json;

use crate::ai::sse::error_event;
use crate::ai::{check_rate_limit, relay_stream, ChatMessage, RateLimitInfo};
use crate::core::ServiceError;
use crate::models::{
    DownloadPdfRequest, GenerateDocumentRequest, GeneratedDocument, GenerationMetadata,
};
use crate::prompts::{
    available_document_types, document_metadata, documents_by_category, get_prompt_template,
    validate_client_details_for_document,
};

use super::error::ApiResult;
use super::state::ApiState;

static DOCUMENTS_GENERATED: Lazy<IntCounterVec> = Lazy::new(|| {
    prometheus::register_int_counter_vec!(
        "documents_generated_total",
        "Documents generated, labelled by type",
        &["document_type"]
    )
    .expect("register documents_generated_total")
});

#[derive(Debug, Deserialize)]
pub struct DocumentTypesQuery {
    #[serde(rename = "type")]
    pub document_type: Option<String>,
    pub category: Option<String>,
}

/// List document types and their metadata, optionally narrowed to a single
/// type (`?type=`) or category (`?category=`).
pub async fn document_types(query: web::Query<DocumentTypesQuery>) -> ApiResult<HttpResponse> {
    if let Some(document_type) = &query.document_type {
        return match document_metadata(document_type) {
            Some(metadata) => Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "documentType": metadata,
            }))),
            None => Ok(HttpResponse::NotFound().json(json!({
                "error": "Document type not found",
                "availableTypes": available_document_types(),
            }))),
        };
    }

    let by_category = documents_by_category();
    let categories: Vec<&str> = by_category.keys().copied().collect();

    if let Some(category) = &query.category {
        return match by_category.get(category.as_str()) {
            Some(documents) => Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "category": category,
                "documents": documents,
                "total": documents.len(),
            }))),
            None => Ok(HttpResponse::NotFound().json(json!({
                "error": "Category not found",
                "availableCategories": categories,
            }))),
        };
    }

    let types = available_document_types();
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "documentTypes": types,
        "documentsByCategory": by_category,
        "total": types.len(),
        "categories": categories,
        "metadata": {
            "supportedRegion": "Australia",
            "legalCompliance": [
                "Australian Consumer Law",
                "Privacy Act 1988",
                "Spam Act 2003",
                "Fair Trading Acts",
                "Competition and Consumer Act 2010",
            ],
            "features": [
                "Real-time streaming generation",
                "Australian legal compliance",
                "Rate limiting by subscription plan",
                "Professional document templates",
                "Mandatory compliance clauses",
            ],
        },
    })))
}

/// Generate a legal document, either as a single JSON response or as a live
/// SSE token stream depending on the `streaming` flag.
pub async fn generate_document(
    req: HttpRequest,
    body: web::Json<GenerateDocumentRequest>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();

    let (Some(document_type), Some(client_details)) =
        (body.document_type.clone(), body.client_details.clone())
    else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Missing required fields: documentType and clientDetails are required",
        })));
    };

    // Per-minute throttle keyed by user, falling back to peer address.
    let throttle_key = body.user_id.clone().unwrap_or_else(|| {
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    });
    if state.request_limiter.check_key(&throttle_key).is_err() {
        return Ok(HttpResponse::TooManyRequests().json(json!({
            "error": "Rate limit exceeded",
            "retry_after": 60,
        })));
    }

    let validation = validate_client_details_for_document(&document_type, &client_details);
    if !validation.is_valid {
        return Err(ServiceError::Validation(validation.errors).into());
    }

    let mut rate_limit: Option<RateLimitInfo> = None;
    if let Some(user_id) = &body.user_id {
        let info = check_rate_limit(state.usage.as_ref(), user_id, body.user_plan).await;
        if info.is_exhausted() {
            return Err(ServiceError::QuotaExceeded {
                reset_time: info.reset_time,
                plan: info.plan_type,
            }
            .into());
        }
        rate_limit = Some(info);
    }

    let template = get_prompt_template(&document_type)
        .ok_or_else(|| ServiceError::UnsupportedDocumentType(document_type.clone()))?;

    let system_prompt = template.build_prompt(&client_details, body.custom_requirements.as_deref());
    let mut user_prompt = format!(
        "Generate a {} document for an Australian business with the following details: {}",
        document_type,
        serde_json::to_string_pretty(&client_details)?,
    );
    if let Some(custom) = body.custom_requirements.as_deref().filter(|c| !c.is_empty()) {
        user_prompt.push_str("\n\nAdditional requirements: ");
        user_prompt.push_str(custom);
    }
    let messages = [
        ChatMessage::system(system_prompt),
        ChatMessage::user(user_prompt),
    ];

    if let Some(user_id) = &body.user_id {
        if let Err(err) = state.usage.record_generation(user_id, &document_type).await {
            tracing::warn!(error = %err, %user_id, "failed to record generation");
        }
    }
    DOCUMENTS_GENERATED
        .with_label_values(&[document_type.as_str()])
        .inc();

    if body.streaming {
        let mut builder = HttpResponse::Ok();
        builder
            .content_type("text/plain; charset=utf-8")
            .insert_header(("Cache-Control", "no-cache"))
            .insert_header(("X-Accel-Buffering", "no"));
        apply_rate_limit_headers(&mut builder, rate_limit.as_ref());

        match state.openai.chat_stream(&messages).await {
            Ok(upstream) => Ok(builder.streaming(relay_stream(upstream))),
            Err(err) => {
                // The SSE contract is already negotiated; faults travel
                // inside the stream body instead of a status code.
                tracing::error!(error = %err, "document generation failed");
                Ok(builder.body(error_event(&err.to_string())))
            }
        }
    } else {
        let document = state.openai.chat(&messages).await?;
        let mut builder = HttpResponse::Ok();
        apply_rate_limit_headers(&mut builder, rate_limit.as_ref());
        Ok(builder.json(GeneratedDocument {
            success: true,
            document,
            document_type,
            generated_at: Utc::now(),
            metadata: GenerationMetadata {
                user_id: body.user_id,
                user_plan: body.user_plan,
                rate_limit_remaining: rate_limit.map(|info| info.remaining),
            },
        }))
    }
}

fn apply_rate_limit_headers(
    builder: &mut actix_web::HttpResponseBuilder,
    info: Option<&RateLimitInfo>,
) {
    if let Some(info) = info {
        builder.insert_header(("X-RateLimit-Remaining", info.remaining.to_string()));
        builder.insert_header(("X-RateLimit-Reset", info.reset_time.to_rfc3339()));
        builder.insert_header(("X-RateLimit-Plan", info.plan_type.to_string()));
    }
}

/// Render document HTML to a downloadable PDF via the hosted renderer.
pub async fn download_pdf(
    body: web::Json<DownloadPdfRequest>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let Some(html) = body.html.filter(|html| !html.is_empty()) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "HTML content is required",
        })));
    };

    let pdf = state.pdf.render(&html).await?;
    let file_name = body.file_name.replace('"', "");

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}.pdf\"", file_name),
        ))
        .body(pdf))
}
