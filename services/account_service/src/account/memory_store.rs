use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Account, AccountStore, AccountUpdate, NewAccount, StoreError, UpdateAck};

/// Process-local store backed by a map from email to account.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing records, as if they had been created earlier.
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts.into_iter().map(|a| (a.email.clone(), a)).collect();
        Self {
            accounts: RwLock::new(accounts),
        }
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_one(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(email).cloned())
    }

    async fn create(&self, candidate: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&candidate.email) {
            return Err(StoreError::DuplicateAccount);
        }

        let account = candidate.into_account(Uuid::new_v4(), 0);
        accounts.insert(account.email.clone(), account.clone());
        Ok(account)
    }

    async fn update_one(&self, email: &str, update: &AccountUpdate) -> Result<UpdateAck, StoreError> {
        let mut accounts = self.accounts.write().await;
        let account = match accounts.get_mut(email) {
            Some(account) => account,
            None => return Ok(UpdateAck::default()),
        };

        match update {
            AccountUpdate::Password(password) => account.password = password.clone(),
        }
        // Same as `ADD Version :one` in DynamoDB: a missing counter counts as 0.
        account.version = Some(account.version.unwrap_or(0) + 1);

        Ok(UpdateAck { matched: 1, modified: 1 })
    }
}
