//! Cross-account `aws_route53_zone_association`
//!
//! The VPC owner creates and deletes the association, but only the zone
//! owner can observe it. Create therefore runs in two phases: `associate`
//! with the provider the resource belongs to, then `verify` with the
//! provider named by `sub_provider`. Read and update go to the zone owner.

use std::sync::Arc;

use extras_core::provider::{
    BoxFuture, Operation, OperationRef, ProviderResult, ResourceDefinition,
};
use extras_core::resource::ResourceData;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::base::route53_zone_association as base;
use crate::cache::SessionCache;
use crate::client::AwsClient;
use crate::dispatch::{Routes, Routing, SUB_PROVIDER, decorate, labeled_client};
use crate::waiter::wait_for_change;

/// Result of the first phase of a create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociateOutcome {
    /// Cleaned change ID to wait for
    pub change_id: String,
    /// Label of the provider that verifies the association
    pub verifier: String,
}

/// Phase one: associate with the VPC owner's credentials
pub async fn associate(
    data: &mut ResourceData,
    client: &AwsClient,
) -> ProviderResult<AssociateOutcome> {
    let change_id = base::associate(data, &client.base).await?;
    Ok(AssociateOutcome {
        change_id,
        verifier: data.get_str(SUB_PROVIDER).to_string(),
    })
}

/// Phase two: wait for propagation with the zone owner's DNS client, then
/// refresh through `update`
pub async fn verify(
    data: &mut ResourceData,
    client: &AwsClient,
    outcome: &AssociateOutcome,
    cache: &SessionCache,
    update: &dyn Operation<AwsClient>,
    cancel: &CancellationToken,
) -> ProviderResult<()> {
    let verifier = labeled_client(&outcome.verifier, cache)?;
    debug!(
        "Waiting for change {} using provider {:?}",
        outcome.change_id, outcome.verifier
    );
    wait_for_change(verifier.base.dns.as_ref(), &outcome.change_id, cancel).await?;
    update.call(data, client, cancel).await
}

struct Create {
    cache: Arc<SessionCache>,
    update: OperationRef<AwsClient>,
}

impl Operation<AwsClient> for Create {
    fn call<'a>(
        &'a self,
        data: &'a mut ResourceData,
        client: &'a AwsClient,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            let outcome = associate(data, client).await?;
            verify(
                data,
                client,
                &outcome,
                &self.cache,
                self.update.as_ref(),
                cancel,
            )
            .await
        })
    }
}

const ROUTES: Routes = Routes {
    create: Routing::Default,
    read: Routing::SubProvider,
    update: Routing::SubProvider,
    delete: Routing::Default,
};

pub fn resource(cache: &Arc<SessionCache>) -> ResourceDefinition<AwsClient> {
    let mut def = decorate(&base::resource(), ROUTES, cache);
    let update = def.update.clone().unwrap_or_else(|| Arc::clone(&def.read));
    def.create = Arc::new(Create {
        cache: Arc::clone(cache),
        update,
    });
    def
}
