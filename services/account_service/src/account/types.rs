use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

/// A registered user. `email` is unique across all accounts and is the key for every lookup.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    #[serde(default = "Uuid::nil")]
    #[builder(default = Uuid::new_v4())]
    pub account_id: Uuid,

    #[builder(setter(into))]
    pub name: String,

    #[builder(setter(into))]
    pub email: String,

    #[serde(default)]
    #[builder(setter(into))]
    pub password: String,

    /// Store-managed revision counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub version: Option<u64>,
}

/// Candidate data for `AccountService::create_account`.
#[derive(Deserialize, PartialEq, Eq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
pub struct NewAccount {
    #[serde(default)]
    #[builder(default, setter(into))]
    pub name: String,

    #[builder(setter(into))]
    pub email: String,

    #[serde(default)]
    #[builder(default, setter(into))]
    pub password: String,
}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountUpdate {
    Password(String),
}

/// Acknowledgement returned by the store after applying an [`AccountUpdate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateAck {
    pub matched: u64,
    pub modified: u64,
}

/// Result of a successful password change, `{"message": "ok"}` on the wire.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PasswordUpdated {
    pub message: String,
}

impl PasswordUpdated {
    pub fn ok() -> Self {
        PasswordUpdated {
            message: "ok".to_string(),
        }
    }
}

impl From<UpdateAck> for PasswordUpdated {
    fn from(_: UpdateAck) -> Self {
        PasswordUpdated::ok()
    }
}

impl NewAccount {
    /// Turns the candidate into a persisted record with the identity chosen by the store.
    pub fn into_account(self, account_id: Uuid, version: u64) -> Account {
        Account {
            account_id,
            name: self.name,
            email: self.email,
            password: self.password,
            version: Some(version),
        }
    }
}
