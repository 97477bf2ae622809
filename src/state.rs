use std::sync::Arc;

use crate::services::{UnknownEventPolicy, UserStore, WebhookVerifier};

/// Shared handles, built once at startup and passed to every worker via `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    /// `None` when no webhook secret is configured.
    pub verifier: Option<WebhookVerifier>,
    pub unknown_event_policy: UnknownEventPolicy,
}

impl AppState {
    pub fn new(
        store: Arc<dyn UserStore>,
        verifier: Option<WebhookVerifier>,
        unknown_event_policy: UnknownEventPolicy,
    ) -> Self {
        Self {
            store,
            verifier,
            unknown_event_policy,
        }
    }
}
