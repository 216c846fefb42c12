//! AWS SDK backed implementations of the API traits

use async_trait::async_trait;
use aws_sdk_directconnect::types::{AddressFamily, NewPrivateVirtualInterfaceAllocation};
use aws_sdk_route53::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_route53::types::{Vpc, VpcRegion};

use super::{
    ApiError, ApiResult, CallerIdentity, ChangeInfo, DirectConnectApi, DnsApi, Gateway, IamApi,
    NewPrivateVirtualInterface, StsApi, VirtualInterface, VpcRef,
};

/// Convert an SDK error, keeping the service error code when there is one
fn api_error<E>(err: E) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    match err.code() {
        Some(code) => ApiError::service(code, err.message().unwrap_or_default()),
        None => ApiError::Transport(format!("{}", DisplayErrorContext(&err))),
    }
}

fn sdk_vpc(vpc: &VpcRef) -> Vpc {
    Vpc::builder()
        .vpc_id(&vpc.vpc_id)
        .vpc_region(VpcRegion::from(vpc.vpc_region.as_str()))
        .build()
}

fn change_info(info: Option<&aws_sdk_route53::types::ChangeInfo>) -> ApiResult<ChangeInfo> {
    let info = info.ok_or_else(|| ApiError::InvalidResponse("missing ChangeInfo".to_string()))?;
    Ok(ChangeInfo {
        id: info.id().to_string(),
        status: info.status().as_str().to_string(),
    })
}

/// Route 53 client
#[derive(Debug, Clone)]
pub struct SdkDns {
    client: aws_sdk_route53::Client,
}

impl SdkDns {
    pub fn new(client: aws_sdk_route53::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DnsApi for SdkDns {
    async fn associate_vpc_with_hosted_zone(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
        comment: Option<&str>,
    ) -> ApiResult<ChangeInfo> {
        let mut req = self
            .client
            .associate_vpc_with_hosted_zone()
            .hosted_zone_id(zone_id)
            .vpc(sdk_vpc(vpc));
        if let Some(comment) = comment {
            req = req.comment(comment);
        }
        let output = req.send().await.map_err(api_error)?;
        change_info(output.change_info())
    }

    async fn disassociate_vpc_from_hosted_zone(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
    ) -> ApiResult<ChangeInfo> {
        let output = self
            .client
            .disassociate_vpc_from_hosted_zone()
            .hosted_zone_id(zone_id)
            .vpc(sdk_vpc(vpc))
            .send()
            .await
            .map_err(api_error)?;
        change_info(output.change_info())
    }

    async fn create_vpc_association_authorization(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
    ) -> ApiResult<()> {
        self.client
            .create_vpc_association_authorization()
            .hosted_zone_id(zone_id)
            .vpc(sdk_vpc(vpc))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_vpc_association_authorization(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
    ) -> ApiResult<()> {
        self.client
            .delete_vpc_association_authorization()
            .hosted_zone_id(zone_id)
            .vpc(sdk_vpc(vpc))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_vpc_association_authorizations(&self, zone_id: &str) -> ApiResult<Vec<VpcRef>> {
        let mut vpcs = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_vpc_association_authorizations()
                .hosted_zone_id(zone_id)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(api_error)?;

            for vpc in output.vpcs() {
                if let Some(vpc_id) = vpc.vpc_id() {
                    let region = vpc.vpc_region().map(|r| r.as_str()).unwrap_or_default();
                    vpcs.push(VpcRef::new(vpc_id, region));
                }
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(vpcs)
    }

    async fn get_change(&self, change_id: &str) -> ApiResult<ChangeInfo> {
        let output = self
            .client
            .get_change()
            .id(change_id)
            .send()
            .await
            .map_err(api_error)?;
        change_info(output.change_info())
    }
}

/// STS client
#[derive(Debug, Clone)]
pub struct SdkSts {
    client: aws_sdk_sts::Client,
}

impl SdkSts {
    pub fn new(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StsApi for SdkSts {
    async fn get_caller_identity(&self) -> ApiResult<CallerIdentity> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(api_error)?;
        Ok(CallerIdentity {
            account: output.account().unwrap_or_default().to_string(),
            arn: output.arn().unwrap_or_default().to_string(),
            user_id: output.user_id().unwrap_or_default().to_string(),
        })
    }
}

/// IAM client
#[derive(Debug, Clone)]
pub struct SdkIam {
    client: aws_sdk_iam::Client,
}

impl SdkIam {
    pub fn new(client: aws_sdk_iam::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IamApi for SdkIam {
    async fn get_current_user_arn(&self) -> ApiResult<String> {
        let output = self.client.get_user().send().await.map_err(api_error)?;
        output
            .user()
            .map(|user| user.arn().to_string())
            .ok_or_else(|| ApiError::InvalidResponse("GetUser returned no user".to_string()))
    }
}

/// Direct Connect client
#[derive(Debug, Clone)]
pub struct SdkDirectConnect {
    client: aws_sdk_directconnect::Client,
}

impl SdkDirectConnect {
    pub fn new(client: aws_sdk_directconnect::Client) -> Self {
        Self { client }
    }
}

fn virtual_interface(vif: &aws_sdk_directconnect::types::VirtualInterface) -> VirtualInterface {
    VirtualInterface {
        id: vif.virtual_interface_id().unwrap_or_default().to_string(),
        state: vif
            .virtual_interface_state()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        name: vif.virtual_interface_name().map(String::from),
        owner_account: vif.owner_account().map(String::from),
        connection_id: vif.connection_id().map(String::from),
        address_family: vif.address_family().map(|f| f.as_str().to_string()),
        amazon_address: vif.amazon_address().map(String::from),
        customer_address: vif.customer_address().map(String::from),
        bgp_auth_key: vif.auth_key().map(String::from),
        virtual_gateway_id: vif.virtual_gateway_id().map(String::from),
        dx_gateway_id: vif.direct_connect_gateway_id().map(String::from),
    }
}

/// Direct Connect reports unknown interface IDs as a client exception
fn is_not_found(err: &ApiError) -> bool {
    match err {
        ApiError::Service { code, message } => {
            code == "DirectConnectClientException" && message.contains("does not exist")
        }
        _ => false,
    }
}

#[async_trait]
impl DirectConnectApi for SdkDirectConnect {
    async fn allocate_private_virtual_interface(
        &self,
        request: &NewPrivateVirtualInterface,
    ) -> ApiResult<VirtualInterface> {
        let allocation = NewPrivateVirtualInterfaceAllocation::builder()
            .virtual_interface_name(&request.name)
            .vlan(request.vlan)
            .asn(request.bgp_asn)
            .address_family(AddressFamily::from(request.address_family.as_str()))
            .set_auth_key(request.bgp_auth_key.clone())
            .set_amazon_address(request.amazon_address.clone())
            .set_customer_address(request.customer_address.clone())
            .set_mtu(request.mtu)
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let output = self
            .client
            .allocate_private_virtual_interface()
            .connection_id(&request.connection_id)
            .owner_account(&request.owner_account_id)
            .new_private_virtual_interface_allocation(allocation)
            .send()
            .await
            .map_err(api_error)?;

        let id = output.virtual_interface_id().ok_or_else(|| {
            ApiError::InvalidResponse("no virtual interface ID returned".to_string())
        })?;

        Ok(VirtualInterface {
            id: id.to_string(),
            state: output
                .virtual_interface_state()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            name: Some(request.name.clone()),
            owner_account: Some(request.owner_account_id.clone()),
            connection_id: Some(request.connection_id.clone()),
            address_family: Some(request.address_family.clone()),
            amazon_address: output.amazon_address().map(String::from),
            customer_address: output.customer_address().map(String::from),
            bgp_auth_key: output.auth_key().map(String::from),
            ..Default::default()
        })
    }

    async fn describe_virtual_interface(&self, id: &str) -> ApiResult<Option<VirtualInterface>> {
        let result = self
            .client
            .describe_virtual_interfaces()
            .virtual_interface_id(id)
            .send()
            .await
            .map_err(api_error);

        match result {
            Ok(output) => Ok(output
                .virtual_interfaces()
                .iter()
                .find(|vif| vif.virtual_interface_id() == Some(id))
                .map(virtual_interface)),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn confirm_private_virtual_interface(
        &self,
        id: &str,
        gateway: &Gateway,
    ) -> ApiResult<String> {
        let mut req = self
            .client
            .confirm_private_virtual_interface()
            .virtual_interface_id(id);
        req = match gateway {
            Gateway::Vpn(gateway_id) => req.virtual_gateway_id(gateway_id),
            Gateway::DirectConnect(gateway_id) => req.direct_connect_gateway_id(gateway_id),
        };

        let output = req.send().await.map_err(api_error)?;
        Ok(output
            .virtual_interface_state()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default())
    }

    async fn delete_virtual_interface(&self, id: &str) -> ApiResult<String> {
        let output = self
            .client
            .delete_virtual_interface()
            .virtual_interface_id(id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(output
            .virtual_interface_state()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_matches_client_exception_only() {
        assert!(is_not_found(&ApiError::service(
            "DirectConnectClientException",
            "Virtual interface dxvif-abc does not exist"
        )));
        assert!(!is_not_found(&ApiError::service(
            "DirectConnectClientException",
            "Connection is not available"
        )));
        assert!(!is_not_found(&ApiError::Transport("does not exist".into())));
    }

    #[test]
    fn sdk_vpc_carries_region() {
        let vpc = sdk_vpc(&VpcRef::new("vpc-0a1b2c3d", "eu-west-1"));
        assert_eq!(vpc.vpc_id(), Some("vpc-0a1b2c3d"));
        assert_eq!(vpc.vpc_region().map(|r| r.as_str()), Some("eu-west-1"));
    }
}
