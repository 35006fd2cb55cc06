use zeroize::Zeroize;

use crate::account::{Account, AccountStore, AccountUpdate, NewAccount, PasswordUpdated, StoreError};
use crate::error::AccountError;

/// Account operations on top of an [`AccountStore`].
///
/// Each operation issues at most one lookup followed by at most one write. Store failures are
/// never retried and reach the caller as [`AccountError::Store`].
pub struct AccountService<S: AccountStore> {
    store: S,
}

impl<S: AccountStore> AccountService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether an account is registered under `email`.
    #[tracing::instrument(skip(self))]
    pub async fn account_exists(&self, email: &str) -> Result<bool, AccountError> {
        let account = self.store.find_one(email).await?;
        Ok(account.is_some())
    }

    /// Checks `candidate_password` against the password stored for `email`.
    ///
    /// Returns `false` both when the account does not exist and when the password differs, so
    /// callers cannot tell the two apart. The comparison is exact: no normalization, case
    /// sensitive.
    #[tracing::instrument(skip(self, candidate_password))]
    pub async fn verify_credential(&self, email: &str, candidate_password: &str) -> Result<bool, AccountError> {
        let mut account = match self.store.find_one(email).await? {
            Some(account) => account,
            None => return Ok(false),
        };

        let valid = account.password == candidate_password;
        account.password.zeroize();

        Ok(valid)
    }

    /// Persists `candidate` unless an account with the same email already exists, and returns the
    /// record as stored.
    #[tracing::instrument(skip_all, fields(email = %candidate.email))]
    pub async fn create_account(&self, candidate: NewAccount) -> Result<Account, AccountError> {
        if self.account_exists(&candidate.email).await? {
            return Err(AccountError::Conflict);
        }

        // The existence check and the write are not atomic. A concurrent creation is caught by
        // the store's own uniqueness constraint.
        self.store.create(candidate).await.map_err(|err| match err {
            StoreError::DuplicateAccount => AccountError::Conflict,
            e => AccountError::Store(e),
        })
    }

    /// Replaces the password of the account registered under `email`.
    ///
    /// The existence check runs first, the confirmation check second. Nothing is written unless
    /// both pass.
    #[tracing::instrument(skip(self, new_password, confirm_password))]
    pub async fn update_password(
        &self,
        email: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<PasswordUpdated, AccountError> {
        if !self.account_exists(email).await? {
            return Err(AccountError::NotFound);
        }

        if new_password != confirm_password {
            return Err(AccountError::BadRequest);
        }

        let ack = self
            .store
            .update_one(email, &AccountUpdate::Password(new_password.to_owned()))
            .await?;
        if ack.matched == 0 {
            tracing::warn!("Account disappeared between the existence check and the update.");
        }

        Ok(ack.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use http::StatusCode;
    use service_core::operation_error::OperationError;

    use super::*;
    use crate::account::{InMemoryAccountStore, UpdateAck};

    /// Counts the writes reaching the wrapped store.
    #[derive(Default)]
    struct RecordingStore {
        inner: InMemoryAccountStore,
        creates: AtomicUsize,
        updates: AtomicUsize,
    }

    impl RecordingStore {
        fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
            Self {
                inner: InMemoryAccountStore::with_accounts(accounts),
                ..Default::default()
            }
        }

        fn writes(&self) -> usize {
            self.creates.load(Ordering::SeqCst) + self.updates.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AccountStore for RecordingStore {
        async fn find_one(&self, email: &str) -> Result<Option<Account>, StoreError> {
            self.inner.find_one(email).await
        }

        async fn create(&self, candidate: NewAccount) -> Result<Account, StoreError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            self.inner.create(candidate).await
        }

        async fn update_one(&self, email: &str, update: &AccountUpdate) -> Result<UpdateAck, StoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.update_one(email, update).await
        }
    }

    /// Every call fails as if the database were unreachable.
    struct UnreachableStore;

    #[async_trait]
    impl AccountStore for UnreachableStore {
        async fn find_one(&self, _: &str) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Backend("User model fails".into()))
        }

        async fn create(&self, _: NewAccount) -> Result<Account, StoreError> {
            Err(StoreError::Backend("User model fails".into()))
        }

        async fn update_one(&self, _: &str, _: &AccountUpdate) -> Result<UpdateAck, StoreError> {
            Err(StoreError::Backend("User model fails".into()))
        }
    }

    /// Misses on lookup but loses the race on create, like a concurrent registration would.
    struct RacedStore;

    #[async_trait]
    impl AccountStore for RacedStore {
        async fn find_one(&self, _: &str) -> Result<Option<Account>, StoreError> {
            Ok(None)
        }

        async fn create(&self, _: NewAccount) -> Result<Account, StoreError> {
            Err(StoreError::DuplicateAccount)
        }

        async fn update_one(&self, _: &str, _: &AccountUpdate) -> Result<UpdateAck, StoreError> {
            unreachable!()
        }
    }

    fn esdras() -> Account {
        Account::builder()
            .name("Esdras Aguilar")
            .email("esdras@lets.com.br")
            .password("123456")
            .version(Some(0))
            .build()
    }

    fn service() -> AccountService<Arc<RecordingStore>> {
        AccountService::new(Arc::new(RecordingStore::with_accounts([esdras()])))
    }

    #[tokio::test]
    async fn account_exists() {
        let service = service();

        assert!(service.account_exists("esdras@lets.com.br").await.unwrap());
        assert!(!service.account_exists("esdras.nao.existente@lets.com.br").await.unwrap());
    }

    #[tokio::test]
    async fn account_exists_propagates_store_failure() {
        let service = AccountService::new(UnreachableStore);

        let err = service.account_exists("esdras@lets.com.br").await.unwrap_err();

        assert!(matches!(err, AccountError::Store(StoreError::Backend(_))));
        assert_eq!(err.to_string(), "User model fails");
    }

    #[tokio::test]
    async fn verify_credential() {
        let service = service();

        let cases = [
            ("esdras@lets.com.br", "123456", true),
            ("esdras@lets.com.br", "123455", false),
            ("esdras@lets.com.br", "123456 ", false),
            ("invalid@lets.com.br", "123456", false),
            ("ghost@x.com", "anything", false),
        ];
        for (email, password, expected) in cases {
            let actual = service.verify_credential(email, password).await.unwrap();
            assert_eq!(actual, expected, "{} / {}", email, password);
        }
    }

    #[tokio::test]
    async fn verify_credential_propagates_store_failure() {
        let service = AccountService::new(UnreachableStore);

        let result = service.verify_credential("esdras@lets.com.br", "123456").await;

        assert!(matches!(result, Err(AccountError::Store(_))));
    }

    #[tokio::test]
    async fn create_account_returns_stored_record() {
        let store = Arc::new(RecordingStore::default());
        let service = AccountService::new(store.clone());
        let candidate = NewAccount::builder().name("alguem").email("abc@abc.com.br").password("triste").build();

        let created = service.create_account(candidate).await.unwrap();

        assert_eq!(created.name, "alguem");
        assert_eq!(created.email, "abc@abc.com.br");
        assert_eq!(created.password, "triste");
        assert_eq!(created.version, Some(0));
        assert_eq!(store.find_one("abc@abc.com.br").await.unwrap(), Some(created));
        assert_eq!(store.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn create_account_with_email_only() {
        let service = service();

        let created = service
            .create_account(NewAccount::builder().email("abc@abc.com.br").build())
            .await
            .unwrap();

        assert!(!created.account_id.is_nil());
        assert_eq!(created.name, "");
    }

    #[tokio::test]
    async fn create_account_conflicts_with_existing_email() {
        let service = service();
        let candidate = NewAccount::builder().email("esdras@lets.com.br").password("other").build();

        let err = service.create_account(candidate).await.unwrap_err();

        assert!(matches!(err, AccountError::Conflict));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "User Already exists");
        assert_eq!(service.store().writes(), 0);
        let stored = service.store().find_one("esdras@lets.com.br").await.unwrap().unwrap();
        assert_eq!(stored.password, "123456");
    }

    #[tokio::test]
    async fn create_account_conflicts_when_store_rejects_duplicate() {
        let service = AccountService::new(RacedStore);

        let result = service
            .create_account(NewAccount::builder().email("abc@abc.com.br").build())
            .await;

        assert!(matches!(result, Err(AccountError::Conflict)));
    }

    #[tokio::test]
    async fn create_account_propagates_store_failure() {
        let service = AccountService::new(UnreachableStore);

        let err = service
            .create_account(NewAccount::builder().email("abc@abc.com.br").build())
            .await
            .unwrap_err();

        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn update_password() {
        let service = service();

        let output = service
            .update_password("esdras@lets.com.br", "teste1234", "teste1234")
            .await
            .unwrap();

        assert_eq!(output, PasswordUpdated::ok());
        assert_eq!(service.store().updates.load(Ordering::SeqCst), 1);
        assert!(service.verify_credential("esdras@lets.com.br", "teste1234").await.unwrap());
        assert!(!service.verify_credential("esdras@lets.com.br", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn update_password_rejects_mismatched_confirmation() {
        let service = service();

        let err = service
            .update_password("esdras@lets.com.br", "teste12345", "teste123456")
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::BadRequest));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Password does not match");
        assert_eq!(service.store().writes(), 0);
    }

    #[tokio::test]
    async fn update_password_of_unknown_account() {
        let service = service();

        let err = service
            .update_password("name@email.com", "teste12345", "teste12345")
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::NotFound));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "User Not Found");
        assert_eq!(service.store().writes(), 0);
    }

    #[tokio::test]
    async fn update_password_checks_existence_before_confirmation() {
        let service = service();

        let result = service
            .update_password("name@email.com", "teste12345", "teste123456")
            .await;

        assert!(matches!(result, Err(AccountError::NotFound)));
    }

    #[tokio::test]
    async fn update_password_propagates_store_failure() {
        let service = AccountService::new(UnreachableStore);

        let result = service
            .update_password("esdras@lets.com.br", "teste1234", "teste1234")
            .await;

        assert!(matches!(result, Err(AccountError::Store(_))));
    }
}
