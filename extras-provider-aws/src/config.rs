//! Provider block configuration

use extras_core::provider::{ProviderError, ProviderResult};
use extras_core::resource::ResourceData;
use log::info;
use serde::Deserialize;

/// Default number of API retries, as for the upstream provider
pub const DEFAULT_MAX_RETRIES: u32 = 25;

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// `assume_role` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssumeRoleConfig {
    pub role_arn: String,
    pub session_name: String,
    pub external_id: String,
    pub policy: String,
}

/// `endpoints` block: per-service endpoint overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub dynamodb: Option<String>,
    pub iam: Option<String>,
    pub ec2: Option<String>,
    pub elb: Option<String>,
    pub kinesis: Option<String>,
    pub s3: Option<String>,
    pub sts: Option<String>,
    pub route53: Option<String>,
    pub directconnect: Option<String>,
}

/// Configuration of one provider block
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub access_key: String,
    pub secret_key: String,
    pub profile: String,
    pub shared_credentials_file: String,
    pub token: String,
    pub region: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    pub insecure: bool,
    pub skip_credentials_validation: bool,
    pub skip_region_validation: bool,
    pub skip_requesting_account_id: bool,
    pub skip_metadata_api_check: bool,
    pub s3_force_path_style: bool,
    pub allowed_account_ids: Vec<String>,
    pub forbidden_account_ids: Vec<String>,
    pub assume_role: Option<AssumeRoleConfig>,
    pub endpoints: EndpointsConfig,
    /// Label under which this provider is published for cross-reference
    pub sub_provider: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            secret_key: String::new(),
            profile: String::new(),
            shared_credentials_file: String::new(),
            token: String::new(),
            region: String::new(),
            max_retries: DEFAULT_MAX_RETRIES,
            insecure: false,
            skip_credentials_validation: false,
            skip_region_validation: false,
            skip_requesting_account_id: false,
            skip_metadata_api_check: false,
            s3_force_path_style: false,
            allowed_account_ids: Vec::new(),
            forbidden_account_ids: Vec::new(),
            assume_role: None,
            endpoints: EndpointsConfig::default(),
            sub_provider: String::new(),
        }
    }
}

impl ProviderConfig {
    /// Read the configuration from a provider block handed over by the host
    pub fn from_data(data: &ResourceData) -> ProviderResult<Self> {
        let region = match data.get_string("region") {
            Some(region) => region.to_string(),
            None => std::env::var("AWS_REGION")
                .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
                .map_err(|_| ProviderError::config("The argument \"region\" is required"))?,
        };

        let max_retries = match data.get_int("max_retries") {
            Some(n) => u32::try_from(n).map_err(|_| {
                ProviderError::config(format!("max_retries must not be negative, got {}", n))
            })?,
            None => DEFAULT_MAX_RETRIES,
        };

        let assume_role = data.get_block("assume_role").map(|block| AssumeRoleConfig {
            role_arn: block.get_str("role_arn").to_string(),
            session_name: block.get_str("session_name").to_string(),
            external_id: block.get_str("external_id").to_string(),
            policy: block.get_str("policy").to_string(),
        });
        match &assume_role {
            Some(role) => info!(
                "assume_role configuration set: (ARN: {:?}, SessionID: {:?}, ExternalID: {:?}, Policy: {:?})",
                role.role_arn, role.session_name, role.external_id, role.policy
            ),
            None => info!("No assume_role block read from configuration"),
        }

        let endpoints = data
            .get_block("endpoints")
            .map(|block| {
                let url = |key: &str| block.get_string(key).map(String::from);
                EndpointsConfig {
                    dynamodb: url("dynamodb"),
                    iam: url("iam"),
                    ec2: url("ec2"),
                    elb: url("elb"),
                    kinesis: url("kinesis"),
                    s3: url("s3"),
                    sts: url("sts"),
                    route53: url("route53"),
                    directconnect: url("directconnect"),
                }
            })
            .unwrap_or_default();

        Ok(Self {
            access_key: data.get_str("access_key").to_string(),
            secret_key: data.get_str("secret_key").to_string(),
            profile: data.get_str("profile").to_string(),
            shared_credentials_file: data.get_str("shared_credentials_file").to_string(),
            token: data.get_str("token").to_string(),
            region,
            max_retries,
            insecure: data.get_bool_or("insecure", false),
            skip_credentials_validation: data.get_bool_or("skip_credentials_validation", false),
            skip_region_validation: data.get_bool_or("skip_region_validation", false),
            skip_requesting_account_id: data.get_bool_or("skip_requesting_account_id", false),
            skip_metadata_api_check: data.get_bool_or("skip_metadata_api_check", false),
            s3_force_path_style: data.get_bool_or("s3_force_path_style", false),
            allowed_account_ids: data.get_string_list("allowed_account_ids"),
            forbidden_account_ids: data.get_string_list("forbidden_account_ids"),
            assume_role,
            endpoints,
            sub_provider: data.get_str("sub_provider").to_string(),
        })
    }

    /// Role to assume, if the block names one
    pub fn role_to_assume(&self) -> Option<&AssumeRoleConfig> {
        self.assume_role
            .as_ref()
            .filter(|role| !role.role_arn.is_empty())
    }
}
