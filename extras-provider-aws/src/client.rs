//! Cloud API contexts handed to resource operations

use std::fmt;
use std::sync::Arc;

use crate::api::{DirectConnectApi, DnsApi, IamApi, StsApi};

/// Credentials, region and service clients authorized for one account
#[derive(Clone)]
pub struct BaseClient {
    pub region: String,
    /// Empty when the account lookup was skipped or failed
    pub partition: String,
    /// Empty when the account lookup was skipped or failed
    pub account_id: String,
    /// Route 53, bound to the global `us-east-1` session
    pub dns: Arc<dyn DnsApi>,
    pub iam: Arc<dyn IamApi>,
    pub sts: Arc<dyn StsApi>,
    pub direct_connect: Arc<dyn DirectConnectApi>,
}

impl fmt::Debug for BaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseClient")
            .field("region", &self.region)
            .field("partition", &self.partition)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

/// Context of a configured provider block: the base context plus the label
/// it was published under (empty when unlabeled)
#[derive(Debug, Clone)]
pub struct AwsClient {
    pub base: BaseClient,
    pub sub_provider: String,
}

impl AwsClient {
    pub fn new(base: BaseClient, sub_provider: impl Into<String>) -> Self {
        Self {
            base,
            sub_provider: sub_provider.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.base.region
    }

    pub fn is_labeled(&self) -> bool {
        !self.sub_provider.is_empty()
    }
}
