pub mod ddb_store;
pub mod memory_store;
pub mod store;
pub mod types;

pub use ddb_store::DdbAccountStore;
pub use memory_store::InMemoryAccountStore;
pub use store::{AccountStore, StoreError};
pub use types::{Account, AccountUpdate, NewAccount, PasswordUpdated, UpdateAck};
