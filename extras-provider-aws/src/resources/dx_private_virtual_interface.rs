//! `aws_dx_private_virtual_interface`: a private virtual interface on the
//! circuit owner's connection, allocated to another account
//!
//! The owner account accepts it with
//! `aws_dx_private_virtual_interface_confirmation`.

use std::time::Duration;

use extras_core::provider::{
    BoxFuture, ProviderError, ProviderResult, ResourceDefinition, op,
};
use extras_core::resource::ResourceData;
use log::{debug, info};
use tokio_util::sync::CancellationToken;

use crate::api::{DirectConnectApi, NewPrivateVirtualInterface, VirtualInterface};
use crate::client::AwsClient;
use crate::schemas::directconnect::private_virtual_interface_schema;
use crate::validation::partition_for_region;
use crate::waiter::StateChangeConf;

/// Virtual interface states
pub mod state {
    pub const CONFIRMING: &str = "confirming";
    pub const VERIFYING: &str = "verifying";
    pub const PENDING: &str = "pending";
    pub const AVAILABLE: &str = "available";
    pub const DOWN: &str = "down";
    pub const DELETING: &str = "deleting";
    pub const DELETED: &str = "deleted";
    pub const REJECTED: &str = "rejected";
}

const ALLOCATION: StateChangeConf = StateChangeConf {
    delay: Duration::from_secs(10),
    pending: &[state::PENDING],
    target: &[state::CONFIRMING, state::AVAILABLE, state::DOWN],
    timeout: Duration::from_secs(10 * 60),
    min_timeout: Duration::from_secs(5),
};

const DELETION: StateChangeConf = StateChangeConf {
    delay: Duration::from_secs(10),
    pending: &[
        state::AVAILABLE,
        state::CONFIRMING,
        state::DELETING,
        state::DOWN,
        state::PENDING,
        state::REJECTED,
        state::VERIFYING,
    ],
    target: &[state::DELETED],
    timeout: Duration::from_secs(10 * 60),
    min_timeout: Duration::from_secs(5),
};

pub fn resource() -> ResourceDefinition<AwsClient> {
    ResourceDefinition {
        schema: private_virtual_interface_schema(),
        create: op(create),
        read: op(read),
        update: None,
        delete: op(delete),
    }
}

/// Poll the interface until `conf` is satisfied. A vanished interface reads
/// as `deleted`.
pub(crate) async fn wait_for_interface(
    dx: &dyn DirectConnectApi,
    id: &str,
    conf: &StateChangeConf,
    cancel: &CancellationToken,
) -> ProviderResult<String> {
    conf.wait_for_state(cancel, move || async move {
        let vif = dx.describe_virtual_interface(id).await?;
        Ok::<_, ProviderError>(
            vif.map(|vif| vif.state)
                .unwrap_or_else(|| state::DELETED.to_string()),
        )
    })
    .await
}

/// Interface as described, `None` once it is gone for good
pub(crate) async fn describe_live(
    dx: &dyn DirectConnectApi,
    id: &str,
) -> ProviderResult<Option<VirtualInterface>> {
    let vif = dx.describe_virtual_interface(id).await?;
    Ok(vif.filter(|vif| vif.state != state::DELETED && vif.state != state::REJECTED))
}

fn int_attribute(data: &ResourceData, key: &str) -> ProviderResult<Option<i32>> {
    data.get_int(key)
        .map(|n| {
            i32::try_from(n)
                .map_err(|_| ProviderError::config(format!("{} is out of range: {}", key, n)))
        })
        .transpose()
}

fn allocation_request(data: &ResourceData) -> ProviderResult<NewPrivateVirtualInterface> {
    Ok(NewPrivateVirtualInterface {
        connection_id: data.get_str("connection_id").to_string(),
        owner_account_id: data.get_str("owner_account_id").to_string(),
        name: data.get_str("name").to_string(),
        vlan: int_attribute(data, "vlan")?
            .ok_or_else(|| ProviderError::config("vlan is required"))?,
        bgp_asn: int_attribute(data, "bgp_asn")?
            .ok_or_else(|| ProviderError::config("bgp_asn is required"))?,
        address_family: data.get_str("address_family").to_string(),
        bgp_auth_key: data.get_string("bgp_auth_key").map(String::from),
        amazon_address: data.get_string("amazon_address").map(String::from),
        customer_address: data.get_string("customer_address").map(String::from),
        mtu: int_attribute(data, "mtu")?,
    })
}

fn interface_arn(client: &AwsClient, id: &str) -> String {
    let partition = if client.base.partition.is_empty() {
        partition_for_region(client.region()).unwrap_or("aws")
    } else {
        client.base.partition.as_str()
    };
    format!(
        "arn:{}:directconnect:{}:{}:dxvif/{}",
        partition,
        client.region(),
        client.base.account_id,
        id
    )
}

fn create<'a>(
    data: &'a mut ResourceData,
    client: &'a AwsClient,
    cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    Box::pin(async move {
        let request = allocation_request(data)?;
        debug!(
            "Allocating private virtual interface on {} for account {}",
            request.connection_id, request.owner_account_id
        );
        let vif = client
            .base
            .direct_connect
            .allocate_private_virtual_interface(&request)
            .await?;
        data.set_id(vif.id.clone());
        info!("Direct Connect private virtual interface {} allocated", vif.id);

        wait_for_interface(
            client.base.direct_connect.as_ref(),
            &vif.id,
            &ALLOCATION,
            cancel,
        )
        .await?;
        read(data, client, cancel).await
    })
}

fn read<'a>(
    data: &'a mut ResourceData,
    client: &'a AwsClient,
    _cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    Box::pin(async move {
        let id = data.id().to_string();
        let Some(vif) = describe_live(client.base.direct_connect.as_ref(), &id).await? else {
            debug!("Direct Connect virtual interface {} is gone", id);
            data.clear_id();
            return Ok(());
        };

        let optional = [
            ("name", vif.name),
            ("owner_account_id", vif.owner_account),
            ("connection_id", vif.connection_id),
            ("address_family", vif.address_family),
            ("amazon_address", vif.amazon_address),
            ("customer_address", vif.customer_address),
            ("bgp_auth_key", vif.bgp_auth_key),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                data.set(key, value);
            }
        }
        data.set("virtual_interface_state", vif.state);
        data.set("arn", interface_arn(client, &id));
        Ok(())
    })
}

fn delete<'a>(
    data: &'a mut ResourceData,
    client: &'a AwsClient,
    cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    Box::pin(async move {
        let id = data.id().to_string();
        debug!("Deleting Direct Connect virtual interface {}", id);
        client
            .base
            .direct_connect
            .delete_virtual_interface(&id)
            .await?;
        wait_for_interface(client.base.direct_connect.as_ref(), &id, &DELETION, cancel).await?;
        Ok(())
    })
}
