use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use super::user::{UserPatch, UserRecord};

/// Envelope entregue pelo Clerk via Svix: `{ "type": ..., "data": {...} }`
///
/// `data` fica sem tipo até sabermos o evento: outros tipos trazem outro formato.
#[derive(Debug, Deserialize, Clone)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

impl WebhookEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from(self.event_type.as_str())
    }

    /// Reads `data` as a user payload. A missing or null `data` is an empty user.
    pub fn user_data(&self) -> Result<ClerkUserData, serde_json::Error> {
        if self.data.is_null() {
            return Ok(ClerkUserData::default());
        }
        ClerkUserData::deserialize(&self.data)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClerkUserData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email_addresses: Option<Vec<ClerkEmailAddress>>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClerkEmailAddress {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

impl ClerkUserData {
    /// The external identity id, if the event carries a non-empty one.
    pub fn clerk_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Primary address when the provider flags one, otherwise the first listed.
    pub fn email(&self) -> Option<&str> {
        let addresses = self.email_addresses.as_ref()?;
        let primary = self.primary_email_address_id.as_deref().and_then(|primary_id| {
            addresses
                .iter()
                .find(|address| address.id.as_deref() == Some(primary_id))
        });

        primary
            .or_else(|| addresses.first())
            .and_then(|address| address.email_address.as_deref())
    }

    /// Record for a `user.created` event. Missing optional fields become "".
    pub fn to_new_record(&self, clerk_id: &str) -> UserRecord {
        UserRecord {
            id: None,
            clerk_id: clerk_id.to_string(),
            email: self.email().unwrap_or_default().to_string(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            photo: self.image_url.clone().unwrap_or_default(),
        }
    }

    pub fn to_patch(&self) -> UserPatch {
        UserPatch {
            email: self.email().map(str::to_string),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            photo: self.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    UserCreated,
    UserUpdated,
    UserDeleted,
    Other(String),
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        match value {
            "user.created" => EventKind::UserCreated,
            "user.updated" => EventKind::UserUpdated,
            "user.deleted" => EventKind::UserDeleted,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::UserCreated => write!(f, "user.created"),
            EventKind::UserUpdated => write!(f, "user.updated"),
            EventKind::UserDeleted => write!(f, "user.deleted"),
            EventKind::Other(name) => write!(f, "{}", name),
        }
    }
}
