use aws_sdk_dynamodb::{Client as RawClient, Config};

/// Thin wrapper around the DynamoDB SDK client. Every table operation used by the services is
/// exposed through a dedicated trait (`GetItem`, `PutItem`, `UpdateItem`) implemented for this
/// type, so repositories can be written against the traits and tested against fakes.
#[derive(Debug, Clone)]
pub struct Adapter {
    pub(crate) raw: RawClient,
}

impl Adapter {
    pub fn from_conf(conf: Config) -> Self {
        RawClient::from_conf(conf).into()
    }
}

impl From<RawClient> for Adapter {
    fn from(raw: RawClient) -> Self {
        Adapter { raw }
    }
}
