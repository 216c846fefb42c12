//! Provider factory: turns a provider block into a published client context

use std::sync::Arc;

use extras_core::provider::{ProviderError, ProviderResult};
use log::{debug, info, warn};

use crate::api::{CallerIdentity, IamApi, StsApi};
use crate::cache::SessionCache;
use crate::client::{AwsClient, BaseClient};
use crate::config::ProviderConfig;
use crate::session::SessionBuilder;
use crate::validation::{parse_account_info, validate_account_id, validate_region};

pub struct ProviderFactory<B> {
    builder: B,
    cache: Arc<SessionCache>,
}

impl<B: SessionBuilder> ProviderFactory<B> {
    pub fn new(builder: B, cache: Arc<SessionCache>) -> Self {
        Self { builder, cache }
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// Build the context for one provider block.
    ///
    /// A labeled context is published to the session cache only once every
    /// check passed.
    pub async fn configure(&self, config: &ProviderConfig) -> ProviderResult<Arc<AwsClient>> {
        if config.skip_region_validation {
            info!("Skipping region validation");
        } else {
            info!("Building AWS region structure");
            validate_region(&config.region)?;
        }

        let session = self.builder.session(config).await?;

        let iam = self.builder.iam(&session);
        let sts = self.builder.sts(&session);

        let mut identity = None;
        if !config.skip_credentials_validation {
            let caller = sts.get_caller_identity().await.map_err(|e| {
                ProviderError::auth(format!("error validating provider credentials: {}", e))
                    .with_cause(e)
            })?;
            identity = Some(caller);
        }

        let (partition, account_id) = if config.skip_requesting_account_id {
            (String::new(), String::new())
        } else {
            account_info(identity, sts.as_ref(), iam.as_ref())
                .await
                .unwrap_or_default()
        };

        validate_account_id(
            &account_id,
            &config.allowed_account_ids,
            &config.forbidden_account_ids,
        )?;

        let base = BaseClient {
            region: config.region.clone(),
            partition,
            account_id,
            dns: self.builder.dns(&session),
            iam,
            sts,
            direct_connect: self.builder.direct_connect(&session),
        };
        let client = Arc::new(AwsClient::new(base, config.sub_provider.clone()));

        if client.is_labeled() {
            self.cache
                .register(&client.sub_provider, Arc::clone(&client))?;
            info!("Provider published as sub_provider {:?}", client.sub_provider);
        }

        Ok(client)
    }
}

/// Partition and account ID of the credentials, from STS or else IAM.
/// Lookup failures leave both unknown.
async fn account_info(
    identity: Option<CallerIdentity>,
    sts: &dyn StsApi,
    iam: &dyn IamApi,
) -> Option<(String, String)> {
    let identity = match identity {
        Some(identity) => Ok(identity),
        None => sts.get_caller_identity().await,
    };
    match identity {
        Ok(identity) => {
            if let Some(info) = parse_account_info(&identity.arn) {
                return Some(info);
            }
            debug!("Cannot parse caller identity ARN {:?}", identity.arn);
        }
        Err(e) => debug!("Getting account ID via sts:GetCallerIdentity failed: {}", e),
    }

    match iam.get_current_user_arn().await {
        Ok(arn) => parse_account_info(&arn),
        Err(e) => {
            warn!("Failed getting account ID, continuing without it: {}", e);
            None
        }
    }
}
