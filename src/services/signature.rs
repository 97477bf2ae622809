// ==================== SVIX WEBHOOK SIGNATURES ====================
// Clerk entrega webhooks via Svix. Cada requisição traz três headers
// (svix-id, svix-timestamp, svix-signature) e o corpo é assinado com
// HMAC-SHA256 sobre "{id}.{timestamp}.{corpo bruto}".

use actix_web::http::header::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::utils::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_ID: &str = "svix-id";
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub const HEADER_SIGNATURE: &str = "svix-signature";

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

#[derive(Debug, Error, PartialEq)]
pub enum SignatureError {
    #[error("webhook secret is not valid base64")]
    InvalidSecret,
    #[error("invalid svix-timestamp header")]
    InvalidTimestamp,
    #[error("message timestamp too old")]
    TimestampTooOld,
    #[error("message timestamp too new")]
    TimestampTooNew,
    #[error("no matching signature found")]
    NoMatchingSignature,
}

/// The three Svix headers, as sent.
#[derive(Debug, Clone)]
pub struct WebhookHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

impl WebhookHeaders {
    pub fn from_header_map(headers: &HeaderMap) -> Result<Self, WebhookError> {
        let get = |name: &'static str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or(WebhookError::MissingHeader(name))
        };

        Ok(Self {
            id: get(HEADER_ID)?,
            timestamp: get(HEADER_TIMESTAMP)?,
            signature: get(HEADER_SIGNATURE)?,
        })
    }
}

#[derive(Clone)]
pub struct WebhookVerifier {
    mac: HmacSha256,
    tolerance_secs: i64,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("key", &"<redacted>")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl WebhookVerifier {
    /// Accepts the secret with or without the `whsec_` prefix.
    pub fn new(secret: &str, tolerance_secs: i64) -> Result<Self, SignatureError> {
        let encoded = secret.trim();
        let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);

        let key = STANDARD
            .decode(encoded)
            .map_err(|_| SignatureError::InvalidSecret)?;
        if key.is_empty() {
            return Err(SignatureError::InvalidSecret);
        }
        let mac = HmacSha256::new_from_slice(&key).map_err(|_| SignatureError::InvalidSecret)?;

        Ok(Self { mac, tolerance_secs })
    }

    pub fn verify(&self, payload: &[u8], headers: &WebhookHeaders) -> Result<(), SignatureError> {
        self.verify_at(payload, headers, chrono::Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        payload: &[u8],
        headers: &WebhookHeaders,
        now: i64,
    ) -> Result<(), SignatureError> {
        let timestamp: i64 = headers
            .timestamp
            .parse()
            .map_err(|_| SignatureError::InvalidTimestamp)?;

        // Timestamp vem do cliente: abs_diff não estoura em i64::MIN/MAX
        let tolerance = self.tolerance_secs.max(0).unsigned_abs();
        if now.abs_diff(timestamp) > tolerance {
            return Err(if timestamp < now {
                SignatureError::TimestampTooOld
            } else {
                SignatureError::TimestampTooNew
            });
        }

        let mac = self.mac_for(&headers.id, &headers.timestamp, payload);

        // Header pode trazer várias assinaturas (rotação de segredo): "v1,abc v1,def"
        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .filter_map(|(_, encoded)| STANDARD.decode(encoded).ok())
            .any(|candidate| mac.clone().verify_slice(&candidate).is_ok());

        if matched {
            Ok(())
        } else {
            Err(SignatureError::NoMatchingSignature)
        }
    }

    /// Produces a `v1,<base64>` signature header value.
    #[cfg(test)]
    pub fn sign(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> String {
        let mac = self.mac_for(msg_id, &timestamp.to_string(), payload);
        format!("{},{}", SIGNATURE_VERSION, STANDARD.encode(mac.finalize().into_bytes()))
    }

    fn mac_for(&self, msg_id: &str, timestamp: &str, payload: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac
    }
}
