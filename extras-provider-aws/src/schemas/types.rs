//! AWS-specific type definitions

use extras_core::resource::Value;
use extras_core::schema::AttributeType;

use crate::validation::{is_valid_region, validate_account_id_format};

/// AWS region type, checked against the known region table
pub fn aws_region() -> AttributeType {
    AttributeType::Custom {
        name: "Region".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) if is_valid_region(s) => Ok(()),
            Value::String(s) => Err(format!("Not a valid region: {}", s)),
            _ => Err("Expected string".to_string()),
        },
    }
}

/// 12-digit AWS account ID
pub fn aws_account_id() -> AttributeType {
    AttributeType::Custom {
        name: "AccountId".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => validate_account_id_format(s),
            _ => Err("Expected string".to_string()),
        },
    }
}

/// Address family of a virtual interface
pub fn address_family() -> AttributeType {
    AttributeType::Enum(vec!["ipv4".to_string(), "ipv6".to_string()])
}

/// 802.1Q VLAN ID
pub fn vlan() -> AttributeType {
    AttributeType::Custom {
        name: "Vlan".to_string(),
        base: Box::new(AttributeType::Int),
        validate: |value| match value {
            Value::Int(n) if (1..=4094).contains(n) => Ok(()),
            Value::Int(_) => Err("VLAN must be between 1 and 4094".to_string()),
            _ => Err("Expected integer".to_string()),
        },
    }
}

/// MTU of a private virtual interface
pub fn mtu() -> AttributeType {
    AttributeType::Custom {
        name: "Mtu".to_string(),
        base: Box::new(AttributeType::Int),
        validate: |value| match value {
            Value::Int(1500) | Value::Int(9001) => Ok(()),
            Value::Int(n) => Err(format!("MTU must be 1500 or 9001, got {}", n)),
            _ => Err("Expected integer".to_string()),
        },
    }
}
