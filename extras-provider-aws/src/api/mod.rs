//! Typed cloud API surface used by the resources
//!
//! Resources talk to AWS through these traits rather than the SDK clients
//! directly. `sdk` holds the AWS SDK implementations; tests plug in fakes.

pub mod sdk;

use async_trait::async_trait;
use extras_core::provider::ProviderError;
use thiserror::Error;

/// Route 53 error code for a hosted zone that does not exist
pub const NO_SUCH_HOSTED_ZONE: &str = "NoSuchHostedZone";

/// Errors returned by the cloud API clients
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The service rejected the request
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    /// The request never got a service response (dispatch, timeout, I/O)
    #[error("{0}")]
    Transport(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response lacked a field the operation relies on
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Service error code, if the service answered
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Service { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    pub fn is_code(&self, code: &str) -> bool {
        self.code() == Some(code)
    }
}

impl From<ApiError> for ProviderError {
    fn from(err: ApiError) -> Self {
        ProviderError::api(err.code().map(String::from), err.to_string()).with_cause(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// A VPC as referenced by Route 53 associations and authorizations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcRef {
    pub vpc_id: String,
    pub vpc_region: String,
}

impl VpcRef {
    pub fn new(vpc_id: impl Into<String>, vpc_region: impl Into<String>) -> Self {
        Self {
            vpc_id: vpc_id.into(),
            vpc_region: vpc_region.into(),
        }
    }
}

/// Propagation status of a Route 53 change batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    /// Raw change ID, possibly prefixed with `/change/`
    pub id: String,
    /// `PENDING` or `INSYNC`
    pub status: String,
}

/// Route 53 operations needed for cross-account private zone association
#[async_trait]
pub trait DnsApi: Send + Sync {
    async fn associate_vpc_with_hosted_zone(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
        comment: Option<&str>,
    ) -> ApiResult<ChangeInfo>;

    async fn disassociate_vpc_from_hosted_zone(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
    ) -> ApiResult<ChangeInfo>;

    async fn create_vpc_association_authorization(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
    ) -> ApiResult<()>;

    async fn delete_vpc_association_authorization(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
    ) -> ApiResult<()>;

    /// All VPCs authorized to associate with the zone (every page)
    async fn list_vpc_association_authorizations(&self, zone_id: &str) -> ApiResult<Vec<VpcRef>>;

    async fn get_change(&self, change_id: &str) -> ApiResult<ChangeInfo>;
}

/// Identity returned by STS GetCallerIdentity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: String,
}

#[async_trait]
pub trait StsApi: Send + Sync {
    async fn get_caller_identity(&self) -> ApiResult<CallerIdentity>;
}

#[async_trait]
pub trait IamApi: Send + Sync {
    /// ARN of the IAM user the credentials belong to
    async fn get_current_user_arn(&self) -> ApiResult<String>;
}

/// Parameters for allocating a private virtual interface to another account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrivateVirtualInterface {
    pub connection_id: String,
    pub owner_account_id: String,
    pub name: String,
    pub vlan: i32,
    pub bgp_asn: i32,
    pub address_family: String,
    pub bgp_auth_key: Option<String>,
    pub amazon_address: Option<String>,
    pub customer_address: Option<String>,
    pub mtu: Option<i32>,
}

/// Gateway the acceptor attaches a confirmed interface to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gateway {
    Vpn(String),
    DirectConnect(String),
}

/// Direct Connect virtual interface as described by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualInterface {
    pub id: String,
    pub state: String,
    pub name: Option<String>,
    pub owner_account: Option<String>,
    pub connection_id: Option<String>,
    pub address_family: Option<String>,
    pub amazon_address: Option<String>,
    pub customer_address: Option<String>,
    pub bgp_auth_key: Option<String>,
    pub virtual_gateway_id: Option<String>,
    pub dx_gateway_id: Option<String>,
}

#[async_trait]
pub trait DirectConnectApi: Send + Sync {
    /// Returns the new interface ID and its initial state
    async fn allocate_private_virtual_interface(
        &self,
        request: &NewPrivateVirtualInterface,
    ) -> ApiResult<VirtualInterface>;

    /// `None` when the interface does not exist (any more)
    async fn describe_virtual_interface(&self, id: &str) -> ApiResult<Option<VirtualInterface>>;

    /// Returns the interface state after confirmation
    async fn confirm_private_virtual_interface(
        &self,
        id: &str,
        gateway: &Gateway,
    ) -> ApiResult<String>;

    /// Returns the interface state after the delete request
    async fn delete_virtual_interface(&self, id: &str) -> ApiResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use extras_core::provider::ErrorKind;

    #[test]
    fn service_errors_keep_code_through_conversion() {
        let err = ApiError::service(NO_SUCH_HOSTED_ZONE, "No hosted zone found with ID: Z9");
        assert!(err.is_code(NO_SUCH_HOSTED_ZONE));

        let provider_err: ProviderError = err.into();
        assert_eq!(provider_err.kind, ErrorKind::Api);
        assert!(provider_err.is_api_code(NO_SUCH_HOSTED_ZONE));
        assert_eq!(
            provider_err.message,
            "NoSuchHostedZone: No hosted zone found with ID: Z9"
        );
    }

    #[test]
    fn transport_errors_have_no_code() {
        let err = ApiError::Transport("dispatch failure".to_string());
        assert_eq!(err.code(), None);
        let provider_err: ProviderError = err.into();
        assert_eq!(provider_err.code, None);
    }
}
