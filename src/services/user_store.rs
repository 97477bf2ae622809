use async_trait::async_trait;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::ReturnDocument,
    Collection,
};
use thiserror::Error;

use crate::{
    database::MongoDB,
    models::{clerk_id_filter, UserPatch, UserRecord},
};

pub const USERS_COLLECTION: &str = "users";

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("database error: {0}")]
    Database(String),
}

/// Persistence for user records, keyed by the external identity id.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_clerk_id(&self, clerk_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Inserts a new record. A record with the same `clerk_id` yields `DuplicateKey`.
    async fn insert(&self, record: UserRecord) -> Result<UserRecord, StoreError>;

    /// Returns the updated record, or `None` if no record matched.
    async fn update_by_clerk_id(
        &self,
        clerk_id: &str,
        patch: &UserPatch,
    ) -> Result<Option<UserRecord>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete_by_clerk_id(&self, clerk_id: &str) -> Result<bool, StoreError>;

    async fn ping(&self) -> bool;

    async fn close(&self);
}

pub struct MongoUserStore {
    db: MongoDB,
    users: Collection<UserRecord>,
}

impl MongoUserStore {
    pub fn new(db: MongoDB) -> Self {
        let users = db.collection::<UserRecord>(USERS_COLLECTION);
        Self { db, users }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            StoreError::DuplicateKey(err.to_string())
        } else {
            StoreError::Database(err.to_string())
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_clerk_id(&self, clerk_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.find_one(clerk_id_filter(clerk_id)).await?)
    }

    async fn insert(&self, mut record: UserRecord) -> Result<UserRecord, StoreError> {
        let result = self.users.insert_one(&record).await?;
        record.id = result.inserted_id.as_object_id();
        Ok(record)
    }

    async fn update_by_clerk_id(
        &self,
        clerk_id: &str,
        patch: &UserPatch,
    ) -> Result<Option<UserRecord>, StoreError> {
        // $set vazio é rejeitado pelo MongoDB
        if patch.is_empty() {
            return self.find_by_clerk_id(clerk_id).await;
        }

        let updated = self
            .users
            .find_one_and_update(
                clerk_id_filter(clerk_id),
                doc! { "$set": patch.to_set_document() },
            )
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated)
    }

    async fn delete_by_clerk_id(&self, clerk_id: &str) -> Result<bool, StoreError> {
        let result = self.users.delete_one(clerk_id_filter(clerk_id)).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> bool {
        self.db.ping().await
    }

    async fn close(&self) {
        self.db.close().await;
    }
}

#[cfg(test)]
pub use memory::InMemoryUserStore;
