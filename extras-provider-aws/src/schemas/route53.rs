//! Route 53 resource schema definitions

use extras_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use super::types as aws_types;

fn zone_vpc_attributes(schema: ResourceSchema) -> ResourceSchema {
    schema
        .attribute(
            AttributeSchema::new("zone_id", AttributeType::String)
                .required()
                .force_new()
                .with_description("ID of the private hosted zone"),
        )
        .attribute(
            AttributeSchema::new("vpc_id", AttributeType::String)
                .required()
                .force_new()
                .with_description("ID of the VPC"),
        )
        .attribute(
            AttributeSchema::new("vpc_region", aws_types::aws_region())
                .computed()
                .force_new()
                .with_description("Region of the VPC (defaults to the provider region)"),
        )
}

/// Plain zone association, as offered by the base provider
pub fn zone_association_schema() -> ResourceSchema {
    zone_vpc_attributes(
        ResourceSchema::new("aws_route53_zone_association")
            .with_description("Association of a private hosted zone with a VPC"),
    )
}

pub fn zone_association_authorization_schema() -> ResourceSchema {
    zone_vpc_attributes(
        ResourceSchema::new("aws_route53_zone_association_authorization").with_description(
            "Authorization for a VPC of another account to associate with a private hosted zone",
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use extras_core::resource::Value;
    use std::collections::HashMap;

    #[test]
    fn zone_and_vpc_are_required() {
        let errors = zone_association_schema().validate(&HashMap::new()).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn valid_authorization() {
        let mut attrs = HashMap::new();
        attrs.insert("zone_id".to_string(), Value::from("Z123ABC"));
        attrs.insert("vpc_id".to_string(), Value::from("vpc-0a1b2c3d"));
        attrs.insert("vpc_region".to_string(), Value::from("eu-west-1"));
        assert!(zone_association_authorization_schema().validate(&attrs).is_ok());
    }
}
