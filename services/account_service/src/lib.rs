//! Account registration and credential checks over a pluggable account store.
//!
//! [`AccountService`] holds the orchestration: existence checks, credential verification, guarded
//! creation and password updates. Persistence goes through [`account::AccountStore`], implemented
//! for DynamoDB ([`account::DdbAccountStore`]) and in process memory
//! ([`account::InMemoryAccountStore`]).

pub mod account;
pub mod context;
pub mod error;
pub mod service;

pub use context::{Context, ContextError, ContextKey};
pub use error::AccountError;
pub use service::AccountService;
