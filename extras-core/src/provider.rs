//! Provider - Resource lifecycle contract between the host and a provider
//!
//! A Provider is configured once per provider block and exposes a set of
//! resource definitions. Each definition bundles a schema with the
//! create/read/update/delete operations the host invokes for a resource
//! instance. Operations receive the provider's configured context ("meta").

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::resource::ResourceData;
use crate::schema::ResourceSchema;

/// Category of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid region, missing or unknown sub_provider, malformed ID
    Config,
    /// Credential chain yielded no provider or failed
    Credentials,
    /// Identity check failed or account not permitted
    Auth,
    /// A cloud API call failed
    Api,
    /// A waiter ran out of time
    Timeout,
    /// The host cancelled the operation
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Config => "configuration error",
            ErrorKind::Credentials => "credentials error",
            ErrorKind::Auth => "authorization error",
            ErrorKind::Api => "API error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub kind: ErrorKind,
    pub message: String,
    /// Service error code for `ErrorKind::Api` (e.g. "NoSuchHostedZone")
    pub code: Option<String>,
    pub resource_id: Option<String>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}] {}", id, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            resource_id: None,
            cause: None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Credentials, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn api(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            ..Self::new(ErrorKind::Api, message)
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    pub fn for_resource(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// True for an API error carrying the given service error code
    pub fn is_api_code(&self, code: &str) -> bool {
        self.kind == ErrorKind::Api && self.code.as_deref() == Some(code)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A lifecycle operation (create, read, update or delete) over meta `M`
pub trait Operation<M>: Send + Sync {
    fn call<'a>(
        &'a self,
        data: &'a mut ResourceData,
        meta: &'a M,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>>;
}

/// Plain function form of an operation
pub type OperationFn<M> = for<'a> fn(
    &'a mut ResourceData,
    &'a M,
    &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>>;

impl<M: Sync> Operation<M> for OperationFn<M> {
    fn call<'a>(
        &'a self,
        data: &'a mut ResourceData,
        meta: &'a M,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        (self)(data, meta, cancel)
    }
}

/// Shared handle to an operation
pub type OperationRef<M> = Arc<dyn Operation<M>>;

/// Wrap a plain function as an operation
pub fn op<M: Sync + 'static>(f: OperationFn<M>) -> OperationRef<M> {
    Arc::new(f)
}

/// Schema plus lifecycle operations of one resource type
///
/// Definitions are immutable values: decorating one produces a new
/// definition and leaves the input untouched.
pub struct ResourceDefinition<M> {
    pub schema: ResourceSchema,
    pub create: OperationRef<M>,
    pub read: OperationRef<M>,
    /// Absent when every attribute forces a new resource
    pub update: Option<OperationRef<M>>,
    pub delete: OperationRef<M>,
}

impl<M> Clone for ResourceDefinition<M> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            create: Arc::clone(&self.create),
            read: Arc::clone(&self.read),
            update: self.update.clone(),
            delete: Arc::clone(&self.delete),
        }
    }
}

impl<M> fmt::Debug for ResourceDefinition<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDefinition")
            .field("resource_type", &self.schema.resource_type)
            .field("updatable", &self.update.is_some())
            .finish()
    }
}

/// Main Provider trait
///
/// The host configures the provider once per provider block and then drives
/// resource operations with the returned meta.
pub trait Provider: Send + Sync {
    /// Context handed to every resource operation
    type Meta: Send + Sync;

    /// Name of this Provider (e.g., "extras")
    fn name(&self) -> &'static str;

    /// Schema of the provider block
    fn schema(&self) -> ResourceSchema;

    /// Build the context for one provider block
    fn configure<'a>(
        &'a self,
        config: &'a ResourceData,
    ) -> BoxFuture<'a, ProviderResult<Arc<Self::Meta>>>;

    /// Resource definitions keyed by host-visible type name
    fn resources(&self) -> HashMap<String, ResourceDefinition<Self::Meta>>;
}
