use actix_web::{middleware, web, App, HttpServer};
use anyhow::Result;
use legally_legit_api::api::{configure_routes, ApiState};
use legally_legit_api::core::AppConfig;
use std::env;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Legally Legit document API");

    // Process metrics for the /metrics endpoint
    prometheus::default_registry().register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;

    // Load configuration; missing secrets abort startup.
    let config = AppConfig::from_env()?;

    // Initialize application state
    let state = web::Data::new(ApiState::new(config));

    // Get server settings
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()?;

    tracing::info!("Starting server on {}:{}", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
