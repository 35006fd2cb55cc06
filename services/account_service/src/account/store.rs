use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::{Account, AccountUpdate, NewAccount, UpdateAck};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("An account with the given email address already exists.")]
    DuplicateAccount,

    #[error("Malformed account record: {0}")]
    Malformed(String),

    #[error(transparent)]
    Backend(#[from] Box<dyn Error + Send + Sync>),
}

/// Persistence for accounts, keyed by email.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Exact-match lookup by email.
    async fn find_one(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Persists a new record. The store assigns the account ID and the initial version.
    ///
    /// # Errors
    ///
    /// `StoreError::DuplicateAccount` when a record with the same email is already stored.
    async fn create(&self, candidate: NewAccount) -> Result<Account, StoreError>;

    /// Applies `update` to the record stored under `email` and increments its version, even when
    /// the new value equals the stored one. A missing record is not an error, it is reported
    /// through `UpdateAck::matched`.
    async fn update_one(&self, email: &str, update: &AccountUpdate) -> Result<UpdateAck, StoreError>;
}

#[async_trait]
impl<S: AccountStore + ?Sized> AccountStore for Arc<S> {
    async fn find_one(&self, email: &str) -> Result<Option<Account>, StoreError> {
        (**self).find_one(email).await
    }

    async fn create(&self, candidate: NewAccount) -> Result<Account, StoreError> {
        (**self).create(candidate).await
    }

    async fn update_one(&self, email: &str, update: &AccountUpdate) -> Result<UpdateAck, StoreError> {
        (**self).update_one(email, update).await
    }
}
