// ==================== CLERK USER SYNC ====================
// Aplica eventos user.created / user.updated / user.deleted na collection users.
// Depois que a assinatura foi validada, falhas de banco viram 200 para que o
// provedor não fique reenviando o mesmo evento indefinidamente.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{
    models::{ClerkUserData, EventKind, WebhookEvent},
    services::user_store::{StoreError, UserStore},
    utils::error::WebhookError,
};

/// What to do with event types this service does not handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownEventPolicy {
    /// Answer 200 so the provider does not retry.
    #[default]
    Acknowledge,
    /// Answer 400.
    Reject,
}

impl FromStr for UnknownEventPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "acknowledge" | "ack" => Ok(UnknownEventPolicy::Acknowledge),
            "reject" => Ok(UnknownEventPolicy::Reject),
            other => Err(format!("unknown policy '{}'", other)),
        }
    }
}

impl fmt::Display for UnknownEventPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownEventPolicy::Acknowledge => write!(f, "acknowledge"),
            UnknownEventPolicy::Reject => write!(f, "reject"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct WebhookOutcome {
    pub success: bool,
    pub message: String,
}

impl WebhookOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

pub async fn process_event(
    store: &dyn UserStore,
    event: &WebhookEvent,
    policy: UnknownEventPolicy,
) -> Result<WebhookOutcome, WebhookError> {
    let kind = event.kind();
    if let EventKind::Other(name) = &kind {
        return handle_unknown(name, policy);
    }

    // Só eventos user.* têm formato conhecido para `data`
    let data = event.user_data().map_err(WebhookError::MalformedPayload)?;
    let clerk_id = data
        .clerk_id()
        .ok_or_else(|| WebhookError::MissingUserId(kind.to_string()))?;

    let outcome = match kind {
        EventKind::UserCreated => handle_created(store, &data, clerk_id).await,
        EventKind::UserUpdated => handle_updated(store, &data, clerk_id).await,
        _ => handle_deleted(store, clerk_id).await,
    };

    Ok(outcome.unwrap_or_else(|e| {
        log::error!("❌ Error processing {} for {}: {}", event.event_type, clerk_id, e);
        WebhookOutcome::failed(format!("Error processing {}", event.event_type))
    }))
}

fn handle_unknown(name: &str, policy: UnknownEventPolicy) -> Result<WebhookOutcome, WebhookError> {
    match policy {
        UnknownEventPolicy::Acknowledge => {
            log::info!("ℹ️  Ignoring webhook event type: {}", name);
            Ok(WebhookOutcome::ok(format!("Event {} acknowledged", name)))
        }
        UnknownEventPolicy::Reject => {
            log::warn!("⚠️  Rejecting unhandled webhook event type: {}", name);
            Err(WebhookError::UnhandledEventType(name.to_string()))
        }
    }
}

async fn handle_created(
    store: &dyn UserStore,
    data: &ClerkUserData,
    clerk_id: &str,
) -> Result<WebhookOutcome, StoreError> {
    if store.find_by_clerk_id(clerk_id).await?.is_some() {
        log::info!("ℹ️  User already exists: {}", clerk_id);
        return Ok(WebhookOutcome::ok("User already exists"));
    }

    match store.insert(data.to_new_record(clerk_id)).await {
        Ok(user) => {
            log::info!("✅ User created: {} ({:?})", user.clerk_id, user.id);
            Ok(WebhookOutcome::ok("User created successfully"))
        }
        // Corrida entre duas entregas do mesmo evento: o índice único decide
        Err(StoreError::DuplicateKey(_)) => {
            log::info!("ℹ️  User already exists (duplicate key): {}", clerk_id);
            Ok(WebhookOutcome::ok("User already exists"))
        }
        Err(e) => Err(e),
    }
}

async fn handle_updated(
    store: &dyn UserStore,
    data: &ClerkUserData,
    clerk_id: &str,
) -> Result<WebhookOutcome, StoreError> {
    if store.find_by_clerk_id(clerk_id).await?.is_none() {
        log::warn!("⚠️  User not found for update: {}", clerk_id);
        return Ok(WebhookOutcome::ok("User not found"));
    }

    match store.update_by_clerk_id(clerk_id, &data.to_patch()).await? {
        Some(_) => {
            log::info!("✅ User updated: {}", clerk_id);
            Ok(WebhookOutcome::ok("User updated successfully"))
        }
        None => {
            log::warn!("⚠️  User disappeared before update: {}", clerk_id);
            Ok(WebhookOutcome::ok("User not found"))
        }
    }
}

async fn handle_deleted(store: &dyn UserStore, clerk_id: &str) -> Result<WebhookOutcome, StoreError> {
    if store.delete_by_clerk_id(clerk_id).await? {
        log::info!("✅ User deleted: {}", clerk_id);
        Ok(WebhookOutcome::ok("User deleted successfully"))
    } else {
        log::warn!("⚠️  User not found for deletion: {}", clerk_id);
        Ok(WebhookOutcome::ok("User not found"))
    }
}
