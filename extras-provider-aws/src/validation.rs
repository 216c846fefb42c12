//! Region and account validation for provider blocks and resources

use extras_core::provider::{ProviderError, ProviderResult};
use log::info;
use regex::Regex;

/// Known regions per partition
const PARTITION_REGIONS: &[(&str, &[&str])] = &[
    (
        "aws",
        &[
            "af-south-1",
            "ap-east-1",
            "ap-northeast-1",
            "ap-northeast-2",
            "ap-northeast-3",
            "ap-south-1",
            "ap-south-2",
            "ap-southeast-1",
            "ap-southeast-2",
            "ap-southeast-3",
            "ap-southeast-4",
            "ca-central-1",
            "ca-west-1",
            "eu-central-1",
            "eu-central-2",
            "eu-north-1",
            "eu-south-1",
            "eu-south-2",
            "eu-west-1",
            "eu-west-2",
            "eu-west-3",
            "il-central-1",
            "me-central-1",
            "me-south-1",
            "sa-east-1",
            "us-east-1",
            "us-east-2",
            "us-west-1",
            "us-west-2",
        ],
    ),
    ("aws-cn", &["cn-north-1", "cn-northwest-1"]),
    ("aws-us-gov", &["us-gov-east-1", "us-gov-west-1"]),
];

/// Partition a known region belongs to
pub fn partition_for_region(region: &str) -> Option<&'static str> {
    PARTITION_REGIONS
        .iter()
        .find(|(_, regions)| regions.contains(&region))
        .map(|(partition, _)| *partition)
}

pub fn is_valid_region(region: &str) -> bool {
    partition_for_region(region).is_some()
}

/// Reject regions missing from the known region table
pub fn validate_region(region: &str) -> ProviderResult<()> {
    if is_valid_region(region) {
        Ok(())
    } else {
        Err(ProviderError::config(format!(
            "Not a valid region: {}",
            region
        )))
    }
}

/// Check that `value` looks like an AWS account ID (exactly 12 digits).
///
/// The message leaves the attribute out; schema errors name it.
pub fn validate_account_id_format(value: &str) -> Result<(), String> {
    let account_id = Regex::new(r"^\d{12}$")
        .map_err(|e| format!("Failed to compile account ID pattern: {}", e))?;
    if account_id.is_match(value) {
        Ok(())
    } else {
        Err(format!(
            "doesn't look like AWS Account ID (exactly 12 digits): {:?}",
            value
        ))
    }
}

/// Apply the forbidden and allowed account lists to the resolved account
pub fn validate_account_id(
    account_id: &str,
    allowed: &[String],
    forbidden: &[String],
) -> ProviderResult<()> {
    if !forbidden.is_empty() {
        info!("Validating account ID against forbidden list");
        if forbidden.iter().any(|id| id == account_id) {
            return Err(ProviderError::auth(format!(
                "Forbidden account ID ({})",
                account_id
            )));
        }
    }

    if !allowed.is_empty() {
        info!("Validating account ID against allowed list");
        if !allowed.iter().any(|id| id == account_id) {
            return Err(ProviderError::auth(format!(
                "Account ID not allowed ({})",
                account_id
            )));
        }
    }

    Ok(())
}

/// Partition and account ID from an ARN such as
/// `arn:aws:iam::123456789012:user/name`
pub fn parse_account_info(arn: &str) -> Option<(String, String)> {
    let mut parts = arn.splitn(6, ':');
    let (Some("arn"), Some(partition), Some(_service), Some(_region), Some(account)) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return None;
    };
    if partition.is_empty() || account.is_empty() {
        return None;
    }
    Some((partition.to_string(), account.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use extras_core::provider::ErrorKind;

    #[test]
    fn regions_map_to_partitions() {
        assert_eq!(partition_for_region("eu-west-1"), Some("aws"));
        assert_eq!(partition_for_region("cn-north-1"), Some("aws-cn"));
        assert_eq!(partition_for_region("us-gov-west-1"), Some("aws-us-gov"));
        assert_eq!(partition_for_region("eu-west-1a"), None);
    }

    #[test]
    fn invalid_region_names_the_region() {
        let err = validate_region("mars-north-1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
        assert_eq!(err.to_string(), "Not a valid region: mars-north-1");
        assert!(validate_region("us-east-1").is_ok());
    }

    #[test]
    fn account_id_must_be_twelve_digits() {
        assert!(validate_account_id_format("123456789012").is_ok());
        for bad in ["12345678901", "1234567890123", "12345678901a", ""] {
            let err = validate_account_id_format(bad).unwrap_err();
            assert!(err.contains("exactly 12 digits"), "{}", err);
        }
    }

    #[test]
    fn allowed_list_rejects_other_accounts() {
        let allowed = vec!["111111111111".to_string()];
        let err = validate_account_id("222222222222", &allowed, &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Auth);
        assert_eq!(err.to_string(), "Account ID not allowed (222222222222)");
        assert!(validate_account_id("111111111111", &allowed, &[]).is_ok());
    }

    #[test]
    fn forbidden_list_rejects_listed_accounts() {
        let forbidden = vec!["222222222222".to_string()];
        let err = validate_account_id("222222222222", &[], &forbidden).unwrap_err();
        assert_eq!(err.to_string(), "Forbidden account ID (222222222222)");
        assert!(validate_account_id("111111111111", &[], &forbidden).is_ok());
        assert!(validate_account_id("", &[], &[]).is_ok());
    }

    #[test]
    fn account_info_from_arn() {
        assert_eq!(
            parse_account_info("arn:aws:iam::123456789012:user/deploy"),
            Some(("aws".to_string(), "123456789012".to_string()))
        );
        assert_eq!(
            parse_account_info("arn:aws-cn:sts::210987654321:assumed-role/r/s"),
            Some(("aws-cn".to_string(), "210987654321".to_string()))
        );
        assert_eq!(parse_account_info("not-an-arn"), None);
        assert_eq!(parse_account_info("arn:aws:iam:::user/x"), None);
    }
}
