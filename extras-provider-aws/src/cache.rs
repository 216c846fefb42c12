//! Session cache: labeled provider contexts shared across resources
//!
//! Every provider block configured with a non-empty `sub_provider` label is
//! published here so resources of other provider blocks can act with its
//! credentials. Entries are never evicted.

use std::collections::HashMap;
use std::sync::Arc;

use extras_core::provider::{ProviderError, ProviderResult};
use log::debug;
use parking_lot::RwLock;

use crate::client::AwsClient;

#[derive(Debug, Default)]
pub struct SessionCache {
    clients: RwLock<HashMap<String, Arc<AwsClient>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a context under `label`, replacing any earlier one
    pub fn register(&self, label: &str, client: Arc<AwsClient>) -> ProviderResult<()> {
        if label.is_empty() {
            return Err(ProviderError::config(
                "Cannot register a provider under an empty sub_provider label",
            ));
        }
        let previous = self.clients.write().insert(label.to_string(), client);
        if previous.is_some() {
            debug!("Replaced provider registered as {:?}", label);
        } else {
            debug!("Registered provider as {:?}", label);
        }
        Ok(())
    }

    /// The empty label is never registered
    pub fn lookup(&self, label: &str) -> Option<Arc<AwsClient>> {
        if label.is_empty() {
            return None;
        }
        self.clients.read().get(label).cloned()
    }

    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::base_client;
    use extras_core::provider::ErrorKind;

    #[test]
    fn lookup_returns_registered_context() {
        let cache = SessionCache::new();
        let client = Arc::new(AwsClient::new(base_client("us-east-1"), "peer"));
        cache.register("peer", Arc::clone(&client)).unwrap();

        let found = cache.lookup("peer").unwrap();
        assert!(Arc::ptr_eq(&found, &client));
        assert!(cache.lookup("other").is_none());
    }

    #[test]
    fn register_overwrites() {
        let cache = SessionCache::new();
        let first = Arc::new(AwsClient::new(base_client("us-east-1"), "peer"));
        let second = Arc::new(AwsClient::new(base_client("eu-west-1"), "peer"));
        cache.register("peer", first).unwrap();
        cache.register("peer", Arc::clone(&second)).unwrap();

        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&cache.lookup("peer").unwrap(), &second));
    }

    #[test]
    fn empty_label_is_never_registered() {
        let cache = SessionCache::new();
        let client = Arc::new(AwsClient::new(base_client("us-east-1"), ""));
        let err = cache.register("", client).unwrap_err();

        assert_eq!(err.kind, ErrorKind::Config);
        assert!(cache.is_empty());
        assert!(cache.lookup("").is_none());
    }
}
