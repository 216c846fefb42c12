//! Resource and change identifiers

use extras_core::provider::{ProviderError, ProviderResult};

/// Prefix Route 53 puts in front of change IDs
pub const CHANGE_ID_PREFIX: &str = "/change/";

/// Composite ID of both zone-association resources
pub fn format_zone_vpc_id(zone_id: &str, vpc_id: &str) -> String {
    format!("{}:{}", zone_id, vpc_id)
}

/// Split a `<zone_id>:<vpc_id>` ID on its first `:`
pub fn parse_zone_vpc_id(id: &str) -> ProviderResult<(String, String)> {
    match id.split_once(':') {
        Some((zone_id, vpc_id)) if !zone_id.is_empty() && !vpc_id.is_empty() => {
            Ok((zone_id.to_string(), vpc_id.to_string()))
        }
        _ => Err(ProviderError::config(format!(
            "Unexpected format of ID ({}), expected ZONEID:VPCID",
            id
        ))),
    }
}

pub fn clean_prefix<'a>(id: &'a str, prefix: &str) -> &'a str {
    id.strip_prefix(prefix).unwrap_or(id)
}

pub fn clean_change_id(id: &str) -> &str {
    clean_prefix(id, CHANGE_ID_PREFIX)
}
