use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// Projeção local do usuário do provedor de identidade (collection: users)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    /// External identity id. Unique across the collection.
    pub clerk_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub photo: String,
}

/// Fields carried by a `user.updated` event. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.photo.is_none()
    }

    /// `$set` body for the present fields, keyed by their stored names.
    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(email) = &self.email {
            set.insert("email", email.clone());
        }
        if let Some(first_name) = &self.first_name {
            set.insert("firstName", first_name.clone());
        }
        if let Some(last_name) = &self.last_name {
            set.insert("lastName", last_name.clone());
        }
        if let Some(photo) = &self.photo {
            set.insert("photo", photo.clone());
        }
        set
    }

    pub fn apply_to(&self, record: &mut UserRecord) {
        if let Some(email) = &self.email {
            record.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            record.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            record.last_name = last_name.clone();
        }
        if let Some(photo) = &self.photo {
            record.photo = photo.clone();
        }
    }
}

pub fn clerk_id_filter(clerk_id: &str) -> Document {
    doc! { "clerkId": clerk_id }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        UserRecord {
            id: None,
            clerk_id: "u1".into(),
            email: "a@b.com".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            photo: "http://x/p.png".into(),
        }
    }

    #[test]
    fn test_record_uses_stored_field_names() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "clerkId": "u1",
                "email": "a@b.com",
                "firstName": "A",
                "lastName": "B",
                "photo": "http://x/p.png"
            })
        );
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let patch = UserPatch {
            first_name: Some("Ada".into()),
            photo: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(patch.to_set_document(), doc! { "firstName": "Ada", "photo": "" });

        let mut user = record();
        patch.apply_to(&mut user);
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.photo, "");
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.last_name, "B");
    }

    #[test]
    fn test_empty_patch() {
        assert!(UserPatch::default().is_empty());
        assert!(UserPatch::default().to_set_document().is_empty());
    }
}
