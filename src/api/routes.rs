use actix_cors::Cors;
use actix_web::{web, HttpResponse};

use super::handlers;
use super::stripe_handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health checks
        .route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness_check))
        .route("/metrics", web::get().to(metrics_endpoint))
        // API surface: any origin, as the dashboard is served elsewhere.
        .service(
            web::scope("/api")
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                        .allowed_headers(vec!["Content-Type", "Authorization"])
                        .max_age(3600),
                )
                .service(
                    web::scope("/ai")
                        .route("/document-types", web::get().to(handlers::document_types))
                        .route(
                            "/generate-document",
                            web::post().to(handlers::generate_document),
                        ),
                )
                .service(
                    web::scope("/document")
                        .route("/download-pdf", web::post().to(handlers::download_pdf)),
                )
                .service(
                    web::scope("/stripe")
                        .route(
                            "/create-checkout-session",
                            web::post().to(stripe_handlers::create_checkout_session),
                        )
                        .route(
                            "/create-portal-session",
                            web::post().to(stripe_handlers::create_portal_session),
                        )
                        .route("/webhook", web::post().to(stripe_handlers::webhook)),
                ),
        );
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy"
    }))
}

async fn readiness_check(state: web::Data<crate::api::ApiState>) -> HttpResponse {
    let supabase_healthy = state.supabase.health().await;

    if supabase_healthy {
        HttpResponse::Ok().json(serde_json::json!({
            "status": "ready",
            "checks": {
                "supabase": "ok"
            }
        }))
    } else {
        HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "not_ready",
            "checks": {
                "supabase": "failed"
            }
        }))
    }
}

async fn metrics_endpoint() -> HttpResponse {
    use prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}
