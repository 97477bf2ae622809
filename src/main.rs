
mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::services::{MongoUserStore, UserStore, WebhookVerifier};
use crate::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    log::info!("🚀 Starting AlphaEraser server...");
    log::info!("📊 Database: {}", config.mongodb_database);

    // Segredo ausente não impede o boot: o endpoint responde 500 até ser configurado
    let verifier = match &config.webhook_secret {
        Some(secret) => Some(
            WebhookVerifier::new(secret, config.webhook_tolerance_secs)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("CLERK_WEBHOOK_SECRET: {}", e)))?,
        ),
        None => {
            log::warn!("⚠️  CLERK_WEBHOOK_SECRET not set - webhook requests will fail with 500");
            None
        }
    };

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&config.mongodb_uri, &config.mongodb_database)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Failed to connect to MongoDB: {}", e)))?;

    log::info!("✅ MongoDB connected successfully");

    let store: Arc<dyn UserStore> = Arc::new(MongoUserStore::new(db));
    let state = web::Data::new(AppState::new(
        store.clone(),
        verifier,
        config.unknown_event_policy,
    ));

    log::info!("🔔 Unknown webhook events policy: {}", config.unknown_event_policy);
    log::info!("🌐 Server starting on {}", config.bind_addr());
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", config.bind_addr());

    let cors_origins = config.cors_allowed_origins.clone();

    // Start HTTP server
    let server = HttpServer::new(move || {
        let cors = if cors_origins.is_empty() {
            Cors::default().allow_any_origin()
        } else {
            cors_origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        };
        let cors = cors
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::AUTHORIZATION,
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::RequestMetrics)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .configure(api::configure)
    })
    .bind(config.bind_addr())?
    .run();

    let result = server.await;

    log::info!("🛑 Server stopped, closing database connection...");
    store.close().await;

    result
}
