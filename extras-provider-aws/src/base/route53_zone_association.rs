//! Plain `aws_route53_zone_association` on a single account

use extras_core::provider::{BoxFuture, ProviderResult, ResourceDefinition, op};
use extras_core::resource::ResourceData;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::api::{NO_SUCH_HOSTED_ZONE, VpcRef};
use crate::client::BaseClient;
use crate::ids::{clean_change_id, format_zone_vpc_id, parse_zone_vpc_id};
use crate::schemas::route53::zone_association_schema;
use crate::waiter::wait_for_change;

pub const COMMENT: &str = "Managed by Terraform";

pub fn resource() -> ResourceDefinition<BaseClient> {
    ResourceDefinition {
        schema: zone_association_schema(),
        create: op(create),
        read: op(read),
        update: Some(op(update)),
        delete: op(delete),
    }
}

/// Associate the VPC with the zone and record the composite ID.
///
/// Returns the cleaned change ID to wait for.
pub async fn associate(data: &mut ResourceData, client: &BaseClient) -> ProviderResult<String> {
    let zone_id = data.get_str("zone_id").to_string();
    let vpc_region = data
        .get_string("vpc_region")
        .unwrap_or(&client.region)
        .to_string();
    let vpc = VpcRef::new(data.get_str("vpc_id"), vpc_region);

    debug!(
        "Associating Route53 Private Zone {} with VPC {} with region {}",
        zone_id, vpc.vpc_id, vpc.vpc_region
    );
    let change = client
        .dns
        .associate_vpc_with_hosted_zone(&zone_id, &vpc, Some(COMMENT))
        .await?;

    data.set_id(format_zone_vpc_id(&zone_id, &vpc.vpc_id));
    data.set("vpc_region", vpc.vpc_region);

    Ok(clean_change_id(&change.id).to_string())
}

fn create<'a>(
    data: &'a mut ResourceData,
    client: &'a BaseClient,
    cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    Box::pin(async move {
        let change_id = associate(data, client).await?;
        wait_for_change(client.dns.as_ref(), &change_id, cancel).await?;
        read(data, client, cancel).await
    })
}

/// Keep the resource while the zone lists an authorization for the VPC
fn read<'a>(
    data: &'a mut ResourceData,
    client: &'a BaseClient,
    _cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    Box::pin(async move {
        let (zone_id, vpc_id) = parse_zone_vpc_id(data.id())?;

        let vpcs = match client.dns.list_vpc_association_authorizations(&zone_id).await {
            Ok(vpcs) => vpcs,
            Err(e) if e.is_code(NO_SUCH_HOSTED_ZONE) => {
                debug!("Route53 zone {} is gone, removing association", zone_id);
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        match vpcs.into_iter().find(|vpc| vpc.vpc_id == vpc_id) {
            Some(vpc) => {
                data.set("zone_id", zone_id);
                data.set("vpc_id", vpc.vpc_id);
                if !vpc.vpc_region.is_empty() {
                    data.set("vpc_region", vpc.vpc_region);
                }
            }
            None => {
                debug!(
                    "VPC {} is not associated with Route53 zone {}",
                    vpc_id, zone_id
                );
                data.clear_id();
            }
        }
        Ok(())
    })
}

/// Only `sub_provider` can change in place; refresh
fn update<'a>(
    data: &'a mut ResourceData,
    client: &'a BaseClient,
    cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    read(data, client, cancel)
}

fn delete<'a>(
    data: &'a mut ResourceData,
    client: &'a BaseClient,
    _cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    Box::pin(async move {
        let (zone_id, vpc_id) = parse_zone_vpc_id(data.id())?;
        let vpc_region = data
            .get_string("vpc_region")
            .unwrap_or(&client.region)
            .to_string();

        debug!(
            "Deleting Route53 Private Zone ({}) association (VPC: {})",
            zone_id, vpc_id
        );
        client
            .dns
            .disassociate_vpc_from_hosted_zone(&zone_id, &VpcRef::new(vpc_id, vpc_region))
            .await?;
        Ok(())
    })
}
