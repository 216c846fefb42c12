//! Provider block schema

use extras_core::resource::Value;
use extras_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use crate::config::DEFAULT_MAX_RETRIES;
use crate::dispatch::SUB_PROVIDER;

fn string(name: &str, description: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::String).with_description(description)
}

fn flag(name: &str, description: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::Bool)
        .with_default(Value::Bool(false))
        .with_description(description)
}

pub fn provider_schema() -> ResourceSchema {
    let string_block = AttributeType::Block(Box::new(AttributeType::String));

    ResourceSchema::new("extras")
        .with_description("AWS provider block, optionally labeled for cross-account resources")
        .attribute(string("access_key", "The access key for API operations"))
        .attribute(string("secret_key", "The secret key for API operations"))
        .attribute(string("profile", "The profile for API operations"))
        .attribute(string(
            "shared_credentials_file",
            "The path to the shared credentials file",
        ))
        .attribute(string("token", "Session token for validating temporary credentials"))
        .attribute(
            AttributeSchema::new("region", AttributeType::String).with_description(
                "The region where AWS operations will take place, checked on configure unless skip_region_validation is set",
            ),
        )
        .attribute(
            AttributeSchema::new("max_retries", AttributeType::Int)
                .with_default(Value::Int(i64::from(DEFAULT_MAX_RETRIES)))
                .with_description("The maximum number of times an AWS API request is retried"),
        )
        .attribute(flag("insecure", "Do not verify TLS certificates"))
        .attribute(flag(
            "skip_credentials_validation",
            "Skip the credentials validation via the STS API",
        ))
        .attribute(flag(
            "skip_region_validation",
            "Skip the check of the region against the known regions",
        ))
        .attribute(flag(
            "skip_requesting_account_id",
            "Skip requesting the account ID",
        ))
        .attribute(flag(
            "skip_metadata_api_check",
            "Skip the AWS Metadata API check",
        ))
        .attribute(flag("s3_force_path_style", "Use path-style S3 addressing"))
        .attribute(AttributeSchema::new("allowed_account_ids", types::string_list()))
        .attribute(AttributeSchema::new("forbidden_account_ids", types::string_list()))
        .attribute(
            AttributeSchema::new("assume_role", string_block.clone())
                .with_description("role_arn, session_name, external_id and policy of a role to assume"),
        )
        .attribute(
            AttributeSchema::new("endpoints", string_block)
                .with_description("Per-service endpoint overrides"),
        )
        .attribute(
            AttributeSchema::new(SUB_PROVIDER, AttributeType::String)
                .with_default(Value::from(""))
                .with_description(
                    "provider name, can be referred to by specific cross-account resources",
                ),
        )
}
