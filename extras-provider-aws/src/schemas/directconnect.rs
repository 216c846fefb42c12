//! Direct Connect resource schema definitions

use extras_core::resource::Value;
use extras_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::types as aws_types;

pub fn private_virtual_interface_schema() -> ResourceSchema {
    ResourceSchema::new("aws_dx_private_virtual_interface")
        .with_description("Private virtual interface allocated to another account")
        .attribute(
            AttributeSchema::new("connection_id", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("owner_account_id", aws_types::aws_account_id())
                .required()
                .force_new()
                .with_description("Account that will own (and confirm) the interface"),
        )
        .attribute(
            AttributeSchema::new("name", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(AttributeSchema::new("vlan", aws_types::vlan()).required().force_new())
        .attribute(
            AttributeSchema::new("bgp_asn", types::positive_int())
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("address_family", aws_types::address_family())
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("bgp_auth_key", AttributeType::String)
                .computed()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("amazon_address", AttributeType::String)
                .computed()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("customer_address", AttributeType::String)
                .computed()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("mtu", aws_types::mtu())
                .with_default(Value::Int(1500))
                .force_new(),
        )
        .attribute(AttributeSchema::new("virtual_interface_state", AttributeType::String).computed())
        .attribute(AttributeSchema::new("arn", AttributeType::String).computed())
}

pub fn private_virtual_interface_confirmation_schema() -> ResourceSchema {
    ResourceSchema::new("aws_dx_private_virtual_interface_confirmation")
        .with_description("Acceptance of a private virtual interface by its owner account")
        .attribute(
            AttributeSchema::new("virtual_interface_id", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("vpn_gateway_id", AttributeType::String)
                .force_new()
                .with_description("Virtual private gateway to attach to"),
        )
        .attribute(
            AttributeSchema::new("dx_gateway_id", AttributeType::String)
                .force_new()
                .with_description("Direct Connect gateway to attach to"),
        )
        .attribute(AttributeSchema::new("virtual_interface_state", AttributeType::String).computed())
}
