use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AlphaEraser API - User Sync",
        version = "1.0.0",
        description = "Backend for the AlphaEraser background-removal app.\n\n**Authentication:** the webhook endpoint is authenticated with Svix signatures (`svix-id`, `svix-timestamp`, `svix-signature`) using the Clerk webhook secret.\n\n**Features:**\n- Clerk user lifecycle sync (created / updated / deleted)\n- Liveness and storage health probes\n- Prometheus metrics"
    ),
    paths(
        // Webhooks
        crate::api::webhooks::clerk_webhooks,

        // Health & Metrics
        crate::api::health::root,
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::services::webhook_service::WebhookOutcome,
            crate::api::health::RootResponse,
            crate::api::health::HealthResponse,
            crate::models::UserRecord,
        )
    ),
    tags(
        (name = "Webhooks", description = "Identity provider callbacks. Events are verified, then applied to the users collection."),
        (name = "Health", description = "Health check and system metrics endpoints for monitoring service status."),
    )
)]
pub struct ApiDoc;
