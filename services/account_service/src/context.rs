use core::fmt;
use std::env;
use std::str::FromStr;

use service_core::ddb::Adapter;
use thiserror::Error;

use crate::account::DdbAccountStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextKey {
    DynamoDbEndpoint,
    AccountsTableName,
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Missing required environment variable {0}.")]
    Missing(ContextKey),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: ContextKey, reason: String },
}

/// Settings of the account service, read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    pub dynamodb_endpoint: Option<http::Uri>,
    pub accounts_table_name: String,
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DynamoDbEndpoint => write!(f, "DYNAMODB_ENDPOINT"),
            Self::AccountsTableName => write!(f, "ACCOUNTS_TABLE_NAME"),
        }
    }
}

impl Context {
    pub fn from_env() -> Result<Self, ContextError> {
        Self::from_lookup(|key| env::var(key.to_string()).ok())
    }

    /// Builds the context from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(ContextKey) -> Option<String>) -> Result<Self, ContextError> {
        let accounts_table_name = lookup(ContextKey::AccountsTableName)
            .filter(|name| !name.is_empty())
            .ok_or(ContextError::Missing(ContextKey::AccountsTableName))?;

        let dynamodb_endpoint = lookup(ContextKey::DynamoDbEndpoint)
            .map(|endpoint| {
                http::Uri::from_str(&endpoint).map_err(|e| ContextError::Invalid {
                    key: ContextKey::DynamoDbEndpoint,
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Context {
            dynamodb_endpoint,
            accounts_table_name,
        })
    }

    /// Connects to DynamoDB with the shared AWS configuration, honoring the endpoint override.
    pub async fn account_store(&self) -> DdbAccountStore<Adapter> {
        let shared_config = aws_config::load_from_env().await;

        let dynamodb_config = match &self.dynamodb_endpoint {
            Some(uri) => {
                tracing::info!(endpoint = %uri, "Using DynamoDB with custom endpoint.");
                aws_sdk_dynamodb::config::Builder::from(&shared_config)
                    .endpoint_resolver(aws_sdk_dynamodb::Endpoint::immutable(uri.clone()))
                    .build()
            }
            None => aws_sdk_dynamodb::config::Config::new(&shared_config),
        };

        DdbAccountStore::new(Adapter::from_conf(dynamodb_config), self.accounts_table_name.as_str())
    }
}
