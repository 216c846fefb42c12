//! Routing of lifecycle operations to the default or a labeled context
//!
//! Resources that span two accounts run some operations with the provider
//! block they belong to and others with the provider named by their
//! `sub_provider` attribute. The wrappers here pick the context and hand the
//! wrapped body the view of it that the body is typed on.

use std::sync::Arc;

use extras_core::provider::{
    BoxFuture, Operation, OperationRef, ProviderError, ProviderResult, ResourceDefinition,
};
use extras_core::resource::{ResourceData, Value};
use extras_core::schema::{AttributeSchema, AttributeType};
use tokio_util::sync::CancellationToken;

use crate::cache::SessionCache;
use crate::client::{AwsClient, BaseClient};

pub const SUB_PROVIDER: &str = "sub_provider";

pub const SUB_PROVIDER_ERROR: &str =
    "Cannot get provider, sub_provider is not set or points to not existing provider?";

/// Context an operation body is typed on
pub trait ClientView: Send + Sync + 'static {
    fn view(client: &AwsClient) -> &Self;
}

impl ClientView for BaseClient {
    fn view(client: &AwsClient) -> &Self {
        &client.base
    }
}

impl ClientView for AwsClient {
    fn view(client: &AwsClient) -> &Self {
        client
    }
}

/// Which context an operation runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// The provider block the resource belongs to
    Default,
    /// The provider named by the resource's `sub_provider` attribute
    SubProvider,
}

/// Routing of each lifecycle operation of a decorated resource
#[derive(Debug, Clone, Copy)]
pub struct Routes {
    pub create: Routing,
    pub read: Routing,
    pub update: Routing,
    pub delete: Routing,
}

impl Routes {
    pub const fn all(routing: Routing) -> Self {
        Self {
            create: routing,
            read: routing,
            update: routing,
            delete: routing,
        }
    }
}

/// Context published under the resource's `sub_provider` label
pub fn sub_provider_client(
    data: &ResourceData,
    cache: &SessionCache,
) -> ProviderResult<Arc<AwsClient>> {
    labeled_client(data.get_str(SUB_PROVIDER), cache)
}

pub fn labeled_client(label: &str, cache: &SessionCache) -> ProviderResult<Arc<AwsClient>> {
    cache
        .lookup(label)
        .ok_or_else(|| ProviderError::config(SUB_PROVIDER_ERROR))
}

/// An operation run with the context its routing selects
pub struct Dispatch<M> {
    inner: OperationRef<M>,
    routing: Routing,
    cache: Arc<SessionCache>,
}

impl<M: ClientView> Operation<AwsClient> for Dispatch<M> {
    fn call<'a>(
        &'a self,
        data: &'a mut ResourceData,
        meta: &'a AwsClient,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            let labeled = match self.routing {
                Routing::Default => None,
                Routing::SubProvider => Some(sub_provider_client(data, &self.cache)?),
            };
            let client = labeled.as_deref().unwrap_or(meta);
            self.inner.call(data, M::view(client), cancel).await
        })
    }
}

pub fn dispatch<M: ClientView>(
    inner: OperationRef<M>,
    routing: Routing,
    cache: &Arc<SessionCache>,
) -> OperationRef<AwsClient> {
    Arc::new(Dispatch {
        inner,
        routing,
        cache: Arc::clone(cache),
    })
}

pub fn sub_provider_attribute() -> AttributeSchema {
    AttributeSchema::new(SUB_PROVIDER, AttributeType::String)
        .with_default(Value::from(""))
        .with_description("Label of the provider used for the operations run on the other account")
}

/// New definition over the same bodies with every operation routed per
/// `routes` and `sub_provider` added to the schema. `def` is left as is.
pub fn decorate<M: ClientView>(
    def: &ResourceDefinition<M>,
    routes: Routes,
    cache: &Arc<SessionCache>,
) -> ResourceDefinition<AwsClient> {
    ResourceDefinition {
        schema: def.schema.clone().attribute(sub_provider_attribute()),
        create: dispatch(Arc::clone(&def.create), routes.create, cache),
        read: dispatch(Arc::clone(&def.read), routes.read, cache),
        update: def
            .update
            .as_ref()
            .map(|update| dispatch(Arc::clone(update), routes.update, cache)),
        delete: dispatch(Arc::clone(&def.delete), routes.delete, cache),
    }
}
