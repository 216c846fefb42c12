//! `aws_dx_private_virtual_interface_confirmation`: the owner account's
//! acceptance of an allocated private virtual interface
//!
//! Every operation runs with the provider named by `sub_provider`, the
//! account the interface was allocated to.

use std::sync::Arc;
use std::time::Duration;

use extras_core::provider::{
    BoxFuture, ProviderError, ProviderResult, ResourceDefinition, op,
};
use extras_core::resource::ResourceData;
use log::debug;
use tokio_util::sync::CancellationToken;

use super::dx_private_virtual_interface::{describe_live, state, wait_for_interface};
use crate::api::Gateway;
use crate::cache::SessionCache;
use crate::client::AwsClient;
use crate::dispatch::{Routes, Routing, decorate, sub_provider_attribute};
use crate::schemas::directconnect::private_virtual_interface_confirmation_schema;
use crate::waiter::StateChangeConf;

const CONFIRMATION: StateChangeConf = StateChangeConf {
    delay: Duration::from_secs(10),
    pending: &[state::CONFIRMING, state::PENDING],
    target: &[state::AVAILABLE, state::DOWN],
    timeout: Duration::from_secs(10 * 60),
    min_timeout: Duration::from_secs(5),
};

fn base_resource() -> ResourceDefinition<AwsClient> {
    ResourceDefinition {
        schema: private_virtual_interface_confirmation_schema(),
        create: op(create),
        read: op(read),
        update: None,
        delete: op(delete),
    }
}

pub fn resource(cache: &Arc<SessionCache>) -> ResourceDefinition<AwsClient> {
    let mut def = decorate(&base_resource(), Routes::all(Routing::SubProvider), cache);
    let mut sub_provider = sub_provider_attribute().required();
    sub_provider.default = None;
    def.schema = def.schema.attribute(sub_provider);
    def
}

fn gateway(data: &ResourceData) -> ProviderResult<Gateway> {
    match (data.get_string("vpn_gateway_id"), data.get_string("dx_gateway_id")) {
        (Some(vgw), None) => Ok(Gateway::Vpn(vgw.to_string())),
        (None, Some(dxgw)) => Ok(Gateway::DirectConnect(dxgw.to_string())),
        _ => Err(ProviderError::config(
            "exactly one of vpn_gateway_id or dx_gateway_id must be set",
        )),
    }
}

fn create<'a>(
    data: &'a mut ResourceData,
    client: &'a AwsClient,
    cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    Box::pin(async move {
        let gateway = gateway(data)?;
        let id = data.get_str("virtual_interface_id").to_string();
        debug!(
            "Confirming Direct Connect virtual interface {} as {:?} (gateway {:?})",
            id, client.sub_provider, gateway
        );
        client
            .base
            .direct_connect
            .confirm_private_virtual_interface(&id, &gateway)
            .await?;
        data.set_id(id.clone());

        wait_for_interface(client.base.direct_connect.as_ref(), &id, &CONFIRMATION, cancel)
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
        match describe_live(client.base.direct_connect.as_ref(), &id).await? {
            Some(vif) => {
                data.set("virtual_interface_id", vif.id);
                data.set("virtual_interface_state", vif.state);
            }
            None => {
                debug!("Direct Connect virtual interface {} is gone", id);
                data.clear_id();
            }
        }
        Ok(())
    })
}

/// The allocating account owns the interface; only forget it
fn delete<'a>(
    data: &'a mut ResourceData,
    _client: &'a AwsClient,
    _cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    Box::pin(async move {
        debug!(
            "Removing confirmation of Direct Connect virtual interface {} from state",
            data.id()
        );
        data.clear_id();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::VirtualInterface;
    use crate::dispatch::{SUB_PROVIDER, SUB_PROVIDER_ERROR};
    use crate::testing::FakeAccount;
    use extras_core::provider::ErrorKind;

    struct Accounts {
        cache: Arc<SessionCache>,
        owner: FakeAccount,
        acceptor: FakeAccount,
        default: AwsClient,
    }

    fn accounts() -> Accounts {
        let cache = Arc::new(SessionCache::new());
        let owner = FakeAccount::new("111111111111");
        let acceptor = FakeAccount::new("222222222222");
        cache
            .register("acceptor", Arc::new(acceptor.client("eu-west-1", "acceptor")))
            .unwrap();
        acceptor.dx.insert(VirtualInterface {
            id: "dxvif-1".to_string(),
            state: state::CONFIRMING.to_string(),
            ..Default::default()
        });
        let default = owner.client("eu-west-1", "");
        Accounts {
            cache,
            owner,
            acceptor,
            default,
        }
    }

    fn confirmation(label: &str) -> ResourceData {
        ResourceData::new()
            .with_attribute("virtual_interface_id", "dxvif-1")
            .with_attribute(SUB_PROVIDER, label)
    }

    #[tokio::test(start_paused = true)]
    async fn create_confirms_with_acceptor() {
        let accounts = accounts();
        let def = resource(&accounts.cache);
        let mut data = confirmation("acceptor").with_attribute("dx_gateway_id", "dxgw-9");

        def.create
            .call(&mut data, &accounts.default, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(data.id(), "dxvif-1");
        assert_eq!(data.get_str("virtual_interface_state"), "available");
        assert_eq!(
            accounts.acceptor.dx.calls()[0],
            "confirm dxvif-1 DirectConnect(\"dxgw-9\")"
        );
        assert_eq!(
            accounts
                .acceptor
                .dx
                .interface("dxvif-1")
                .and_then(|vif| vif.dx_gateway_id),
            Some("dxgw-9".to_string())
        );
        assert!(accounts.owner.dx.calls().is_empty());
    }

    #[tokio::test]
    async fn create_requires_exactly_one_gateway() {
        let accounts = accounts();
        let def = resource(&accounts.cache);

        for mut data in [
            confirmation("acceptor"),
            confirmation("acceptor")
                .with_attribute("vpn_gateway_id", "vgw-1")
                .with_attribute("dx_gateway_id", "dxgw-1"),
        ] {
            let err = def
                .create
                .call(&mut data, &accounts.default, &CancellationToken::new())
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Config);
        }
        assert!(accounts.acceptor.dx.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_sub_provider_fails_before_any_call() {
        let accounts = accounts();
        let def = resource(&accounts.cache);
        let mut data = confirmation("nobody").with_attribute("vpn_gateway_id", "vgw-1");

        let err = def
            .create
            .call(&mut data, &accounts.default, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.message, SUB_PROVIDER_ERROR);
        assert!(accounts.acceptor.dx.calls().is_empty());
        assert!(accounts.owner.dx.calls().is_empty());
    }

    #[tokio::test]
    async fn read_clears_id_when_interface_is_gone() {
        let accounts = accounts();
        let def = resource(&accounts.cache);
        let mut data = confirmation("acceptor").with_id("dxvif-404");

        def.read
            .call(&mut data, &accounts.default, &CancellationToken::new())
            .await
            .unwrap();
        assert!(data.is_new());
    }

    #[tokio::test]
    async fn delete_only_forgets() {
        let accounts = accounts();
        let def = resource(&accounts.cache);
        let mut data = confirmation("acceptor").with_id("dxvif-1");

        def.delete
            .call(&mut data, &accounts.default, &CancellationToken::new())
            .await
            .unwrap();

        assert!(data.is_new());
        assert!(accounts.acceptor.dx.calls().is_empty());
        assert!(accounts.acceptor.dx.interface("dxvif-1").is_some());
    }

    #[test]
    fn sub_provider_is_required() {
        let accounts = accounts();
        let schema = resource(&accounts.cache).schema;
        let attr = &schema.attributes[SUB_PROVIDER];
        assert!(attr.required);
        assert_eq!(attr.default, None);
    }
}
