//! Extras AWS Provider
//!
//! Cross-account resources on top of the AWS provider. Every provider block
//! may carry a `sub_provider` label; the configured context is then published
//! under that label so resources of another block can run some of their
//! operations with it. Route 53 private zone associations use this to let
//! the VPC owner associate while the zone owner verifies, and Direct Connect
//! private virtual interfaces to let the owner account confirm an interface
//! allocated by the circuit owner.

pub mod api;
pub mod base;
pub mod cache;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod factory;
pub mod ids;
pub mod resources;
pub mod schemas;
pub mod session;
pub mod validation;
pub mod waiter;

#[cfg(test)]
mod testing;

use std::collections::HashMap;
use std::sync::Arc;

use extras_core::provider::{
    BoxFuture, Provider, ProviderError, ProviderResult, ResourceDefinition,
};
use extras_core::resource::ResourceData;
use extras_core::schema::ResourceSchema;
use log::debug;

use crate::cache::SessionCache;
use crate::client::AwsClient;
use crate::config::ProviderConfig;
use crate::factory::ProviderFactory;
use crate::session::{SdkSessionBuilder, SessionBuilder};

/// Prefix of the resource type names served by this provider
pub const DEFAULT_PREFIX: &str = "extras_";

/// The extras provider.
///
/// All provider blocks configured through one instance share its session
/// cache, so a label published by one block is visible to the resources of
/// every other block.
pub struct ExtrasProvider<B: SessionBuilder = SdkSessionBuilder> {
    prefix: String,
    cache: Arc<SessionCache>,
    factory: ProviderFactory<B>,
}

impl ExtrasProvider {
    /// Provider backed by the AWS SDK
    pub fn new() -> Self {
        Self::with_builder(SdkSessionBuilder::new())
    }
}

impl Default for ExtrasProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: SessionBuilder> ExtrasProvider<B> {
    pub fn with_builder(builder: B) -> Self {
        let cache = Arc::new(SessionCache::new());
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            factory: ProviderFactory::new(builder, Arc::clone(&cache)),
            cache,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    /// Configure one provider block: read it, build and check the context,
    /// and publish it when labeled
    pub async fn configure_block(&self, block: &ResourceData) -> ProviderResult<Arc<AwsClient>> {
        let schema = schemas::provider::provider_schema();
        let mut block = block.clone();
        schema.apply_defaults(&mut block);
        schema.validate(block.attributes()).map_err(|errors| {
            let details: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ProviderError::config(format!(
                "Invalid provider configuration: {}",
                details.join("; ")
            ))
        })?;

        let config = ProviderConfig::from_data(&block)?;
        debug!(
            "Configuring provider for region {} (sub_provider: {:?})",
            config.region, config.sub_provider
        );
        self.factory.configure(&config).await
    }

    /// Resource definitions under their unprefixed type names
    fn definitions(&self) -> Vec<ResourceDefinition<AwsClient>> {
        vec![
            resources::route53_zone_association_authorization::resource(),
            resources::route53_zone_association::resource(&self.cache),
            resources::dx_private_virtual_interface::resource(),
            resources::dx_private_virtual_interface_confirmation::resource(&self.cache),
        ]
    }
}

impl<B: SessionBuilder> Provider for ExtrasProvider<B> {
    type Meta = AwsClient;

    fn name(&self) -> &'static str {
        "extras"
    }

    fn schema(&self) -> ResourceSchema {
        schemas::provider::provider_schema()
    }

    fn configure<'a>(
        &'a self,
        config: &'a ResourceData,
    ) -> BoxFuture<'a, ProviderResult<Arc<AwsClient>>> {
        Box::pin(self.configure_block(config))
    }

    fn resources(&self) -> HashMap<String, ResourceDefinition<AwsClient>> {
        self.definitions()
            .into_iter()
            .map(|mut def| {
                let name = format!("{}{}", self.prefix, def.schema.resource_type);
                def.schema = def.schema.renamed(name.clone());
                (name, def)
            })
            .collect()
    }
}
