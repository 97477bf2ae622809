pub mod health;
pub mod metrics;
pub mod swagger;
pub mod webhooks;

use actix_web::web;

/// Rotas da API (compartilhadas entre `main` e os testes)
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Liveness + health
        .route("/", web::get().to(health::root))
        .route("/api/health", web::get().to(health::health_check))
        // Metrics
        .route("/metrics", web::get().to(metrics::get_metrics))
        // Clerk webhooks (Svix)
        .service(
            web::scope("/api/user")
                .route("/webhooks", web::post().to(webhooks::clerk_webhooks))
        );
}
