use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::{PutItemError, PutItemErrorKind, UpdateItemError, UpdateItemErrorKind};
use aws_sdk_dynamodb::model::AttributeValue;
use aws_sdk_dynamodb::types::SdkError;
use common_macros::hash_map;
use service_core::ddb::get_item::{GetItem, GetItemInput};
use service_core::ddb::put_item::{PutItem, PutItemInput};
use service_core::ddb::update_item::{UpdateItem, UpdateItemInput};
use service_core::simple_err_map;
use uuid::Uuid;

use super::{Account, AccountStore, AccountUpdate, NewAccount, StoreError, UpdateAck};

pub trait ThreadSafeDdbClient: GetItem + PutItem + UpdateItem + Send + Sync {}
impl<T: GetItem + PutItem + UpdateItem + Send + Sync> ThreadSafeDdbClient for T {}

/// Accounts table in DynamoDB. Items are keyed by `Email`.
pub struct DdbAccountStore<T: ThreadSafeDdbClient> {
    ddb: T,
    accounts_table_name: String,
}

impl<T: ThreadSafeDdbClient> DdbAccountStore<T> {
    pub fn new(ddb: T, accounts_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            accounts_table_name: accounts_table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.accounts_table_name
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> AccountStore for DdbAccountStore<T> {
    async fn find_one(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let get_item_input = GetItemInput::builder()
            .table_name(self.accounts_table_name.as_str())
            .key(account_key_from_email(email))
            .consistent_read(true)
            .build();
        let output = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(simple_err_map!("Failed to get item from DynamoDB.", |e| StoreError::Backend(e.into())))?;

        output.item.map(account_from_item).transpose()
    }

    async fn create(&self, candidate: NewAccount) -> Result<Account, StoreError> {
        let account = candidate.into_account(Uuid::new_v4(), 0);
        let put_item_input = PutItemInput::builder()
            .table_name(self.accounts_table_name.as_str())
            .item(account_to_item(&account))
            .condition_expression("attribute_not_exists(Email)")
            .build();

        self.ddb.put_item(put_item_input).await.map_err(|err| match err {
            SdkError::ServiceError {
                err:
                    PutItemError {
                        kind: PutItemErrorKind::ConditionalCheckFailedException(_),
                        ..
                    },
                ..
            } => StoreError::DuplicateAccount,
            e => {
                tracing::error!(error = ?e, "Failed to put item in DynamoDB.");
                StoreError::Backend(e.into())
            }
        })?;

        Ok(account)
    }

    async fn update_one(&self, email: &str, update: &AccountUpdate) -> Result<UpdateAck, StoreError> {
        let (update_expression, values) = match update {
            AccountUpdate::Password(password) => (
                "SET Password = :password ADD Version :one",
                hash_map! {
                    ":password".to_string() => AttributeValue::S(password.clone()),
                    ":one".to_string() => AttributeValue::N("1".to_string()),
                },
            ),
        };
        let update_item_input = UpdateItemInput::builder()
            .table_name(self.accounts_table_name.as_str())
            .key(account_key_from_email(email))
            .update_expression(update_expression)
            .condition_expression("attribute_exists(Email)")
            .expression_attribute_values(values)
            .build();

        match self.ddb.update_item(update_item_input).await {
            Ok(_) => Ok(UpdateAck { matched: 1, modified: 1 }),
            Err(SdkError::ServiceError {
                err:
                    UpdateItemError {
                        kind: UpdateItemErrorKind::ConditionalCheckFailedException(_),
                        ..
                    },
                ..
            }) => Ok(UpdateAck::default()),
            Err(e) => {
                tracing::error!(error = ?e, "Failed to update item in DynamoDB.");
                Err(StoreError::Backend(e.into()))
            }
        }
    }
}

/// Given an email address, creates the map to be used as key to the accounts table.
fn account_key_from_email(email: &str) -> HashMap<String, AttributeValue> {
    hash_map! {
        "Email".to_string() => AttributeValue::S(email.to_owned()),
    }
}

fn account_to_item(account: &Account) -> HashMap<String, AttributeValue> {
    let mut item = hash_map! {
        "AccountId".to_string() => AttributeValue::S(account.account_id.hyphenated().to_string()),
        "Name".to_string() => AttributeValue::S(account.name.clone()),
        "Email".to_string() => AttributeValue::S(account.email.clone()),
        "Password".to_string() => AttributeValue::S(account.password.clone()),
    };
    if let Some(version) = account.version {
        item.insert("Version".to_string(), AttributeValue::N(version.to_string()));
    }
    item
}

fn account_from_item(mut item: HashMap<String, AttributeValue>) -> Result<Account, StoreError> {
    let account_id = take_string(&mut item, "AccountId")?;
    let account_id = Uuid::parse_str(&account_id)
        .map_err(|e| StoreError::Malformed(format!("AccountId {:?} is not a UUID: {}", account_id, e)))?;

    let password = if item.contains_key("Password") {
        take_string(&mut item, "Password")?
    } else {
        String::new()
    };

    let version = match item.remove("Version") {
        None => None,
        Some(AttributeValue::N(n)) => Some(
            n.parse::<u64>()
                .map_err(|_| StoreError::Malformed(format!("Version {:?} is not a counter", n)))?,
        ),
        Some(_) => return Err(StoreError::Malformed("Version is not a number".to_string())),
    };

    Ok(Account {
        account_id,
        name: take_string(&mut item, "Name")?,
        email: take_string(&mut item, "Email")?,
        password,
        version,
    })
}

fn take_string(item: &mut HashMap<String, AttributeValue>, attr: &str) -> Result<String, StoreError> {
    match item.remove(attr) {
        Some(AttributeValue::S(s)) => Ok(s),
        Some(_) => Err(StoreError::Malformed(format!("{} is not a string", attr))),
        None => Err(StoreError::Malformed(format!("{} is missing", attr))),
    }
}
