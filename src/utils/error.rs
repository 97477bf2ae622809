use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::services::signature::SignatureError;

/// Failures that stop a webhook before any storage call is made.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Webhook secret not configured")]
    SecretNotConfigured,
    #[error("Missing {0} header")]
    MissingHeader(&'static str),
    #[error("Webhook verification failed")]
    InvalidSignature(#[source] SignatureError),
    #[error("Invalid webhook payload")]
    MalformedPayload(#[source] serde_json::Error),
    #[error("Missing user id in {0} event")]
    MissingUserId(String),
    #[error("Unhandled event type: {0}")]
    UnhandledEventType(String),
}

impl WebhookError {
    /// Detail placed in the `error` field of the response body.
    fn detail(&self) -> String {
        match self {
            WebhookError::InvalidSignature(e) => e.to_string(),
            WebhookError::MalformedPayload(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for WebhookError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::SecretNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::MissingHeader(_)
            | WebhookError::InvalidSignature(_)
            | WebhookError::MalformedPayload(_)
            | WebhookError::MissingUserId(_)
            | WebhookError::UnhandledEventType(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "message": self.to_string(),
            "error": self.detail()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: WebhookError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WebhookError::SecretNotConfigured.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebhookError::MissingHeader("svix-id").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::InvalidSignature(SignatureError::NoMatchingSignature).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::UnhandledEventType("session.created".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn test_signature_failure_body_is_generic() {
        let body = body_of(WebhookError::InvalidSignature(SignatureError::TimestampTooOld)).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Webhook verification failed");
        assert_eq!(body["error"], "message timestamp too old");
    }

    #[actix_web::test]
    async fn test_malformed_payload_body() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let body = body_of(WebhookError::MalformedPayload(parse_err)).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid webhook payload");
        assert!(body["error"].as_str().unwrap().len() > 0);
    }
}
