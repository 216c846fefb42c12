//! `aws_route53_zone_association_authorization`: lets a VPC of another
//! account associate with a private hosted zone

use extras_core::provider::{BoxFuture, ProviderResult, ResourceDefinition, op};
use extras_core::resource::ResourceData;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::api::{NO_SUCH_HOSTED_ZONE, VpcRef};
use crate::client::AwsClient;
use crate::ids::{format_zone_vpc_id, parse_zone_vpc_id};
use crate::schemas::route53::zone_association_authorization_schema;

pub fn resource() -> ResourceDefinition<AwsClient> {
    ResourceDefinition {
        schema: zone_association_authorization_schema(),
        create: op(create),
        read: op(read),
        update: None,
        delete: op(delete),
    }
}

fn create<'a>(
    data: &'a mut ResourceData,
    client: &'a AwsClient,
    cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    Box::pin(async move {
        let zone_id = data.get_str("zone_id").to_string();
        let vpc_region = data
            .get_string("vpc_region")
            .unwrap_or(client.region())
            .to_string();
        let vpc = VpcRef::new(data.get_str("vpc_id"), vpc_region);

        debug!(
            "Creating Association Authorization Route53 Private Zone {} with VPC {} with region {}",
            zone_id, vpc.vpc_id, vpc.vpc_region
        );
        client
            .base
            .dns
            .create_vpc_association_authorization(&zone_id, &vpc)
            .await?;

        data.set_id(format_zone_vpc_id(&zone_id, &vpc.vpc_id));
        data.set("vpc_region", vpc.vpc_region);

        read(data, client, cancel).await
    })
}

fn read<'a>(
    data: &'a mut ResourceData,
    client: &'a AwsClient,
    _cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    Box::pin(async move {
        let (zone_id, vpc_id) = parse_zone_vpc_id(data.id())?;

        let vpcs = match client
            .base
            .dns
            .list_vpc_association_authorizations(&zone_id)
            .await
        {
            Ok(vpcs) => vpcs,
            Err(e) if e.is_code(NO_SUCH_HOSTED_ZONE) => {
                debug!("Route53 zone {} is gone, removing authorization", zone_id);
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if vpcs.iter().any(|vpc| vpc.vpc_id == vpc_id) {
            data.set("zone_id", zone_id);
            data.set("vpc_id", vpc_id);
        } else {
            data.clear_id();
        }
        Ok(())
    })
}

fn delete<'a>(
    data: &'a mut ResourceData,
    client: &'a AwsClient,
    _cancel: &'a CancellationToken,
) -> BoxFuture<'a, ProviderResult<()>> {
    Box::pin(async move {
        let (zone_id, vpc_id) = parse_zone_vpc_id(data.id())?;
        debug!(
            "Deleting Route53 Association Authorization Private Zone ({}) association (VPC: {})",
            zone_id, vpc_id
        );

        let vpc = VpcRef::new(vpc_id, data.get_str("vpc_region"));
        client
            .base
            .dns
            .delete_vpc_association_authorization(&zone_id, &vpc)
            .await?;
        Ok(())
    })
}
