use actix_web::{web, HttpRequest, HttpResponse};

use crate::{
    api::metrics,
    models::WebhookEvent,
    services::{webhook_service, WebhookHeaders},
    state::AppState,
    utils::error::WebhookError,
};

/// POST /api/user/webhooks - Sincroniza usuários do Clerk
///
/// O corpo é verificado como bytes brutos: re-serializar o JSON quebraria a assinatura.
#[utoipa::path(
    post,
    path = "/api/user/webhooks",
    tag = "Webhooks",
    params(
        ("svix-id" = String, Header, description = "Svix message id"),
        ("svix-timestamp" = String, Header, description = "Unix seconds the message was signed at"),
        ("svix-signature" = String, Header, description = "Space separated `v1,<base64>` signatures")
    ),
    request_body(content = String, description = "Raw `{type, data}` event envelope", content_type = "application/json"),
    responses(
        (status = 200, description = "Event handled or acknowledged", body = crate::services::WebhookOutcome),
        (status = 400, description = "Missing headers, bad signature or malformed payload"),
        (status = 500, description = "Webhook secret not configured")
    )
)]
pub async fn clerk_webhooks(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebhookError> {
    metrics::increment_webhook_count();

    match handle(&req, &body, &state).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(e) => {
            metrics::increment_webhook_rejected_count();
            log::warn!("❌ Webhook rejected: {}", e);
            Err(e)
        }
    }
}

async fn handle(
    req: &HttpRequest,
    body: &[u8],
    state: &AppState,
) -> Result<webhook_service::WebhookOutcome, WebhookError> {
    let verifier = state
        .verifier
        .as_ref()
        .ok_or(WebhookError::SecretNotConfigured)?;

    let headers = WebhookHeaders::from_header_map(req.headers())?;
    log::info!("📨 POST /api/user/webhooks - svix-id: {}", headers.id);

    verifier
        .verify(body, &headers)
        .map_err(WebhookError::InvalidSignature)?;

    let event: WebhookEvent =
        serde_json::from_slice(body).map_err(WebhookError::MalformedPayload)?;
    log::info!("🔔 Webhook event: {} ({})", event.event_type, headers.id);

    webhook_service::process_event(state.store.as_ref(), &event, state.unknown_event_policy).await
}
