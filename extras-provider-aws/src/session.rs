//! AWS sessions: credentials, transport and per-service client configuration

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::retry::RetryConfig;
use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_sts::error::DisplayErrorContext;
use extras_core::provider::{ProviderError, ProviderResult};
use log::{debug, info, warn};

use crate::api::sdk::{SdkDirectConnect, SdkDns, SdkIam, SdkSts};
use crate::api::{DirectConnectApi, DnsApi, IamApi, StsApi};
use crate::config::{EndpointsConfig, ProviderConfig};

/// Region the global services (Route 53) are signed for
pub const GLOBAL_REGION: &str = "us-east-1";

pub const NO_CREDENTIALS_MESSAGE: &str = "No valid credential sources found for AWS Provider.
  Please see https://terraform.io/docs/providers/aws/index.html for more information on
  providing credentials for the AWS Provider";

/// Builds authenticated sessions and the service clients bound to them
///
/// The provider factory drives this in a fixed order; everything that talks
/// to the credential chain or the network lives behind it.
#[async_trait]
pub trait SessionBuilder: Send + Sync {
    type Session: Send + Sync;

    /// Resolve credentials and build the base and global sessions
    async fn session(&self, config: &ProviderConfig) -> ProviderResult<Self::Session>;

    fn iam(&self, session: &Self::Session) -> Arc<dyn IamApi>;

    fn sts(&self, session: &Self::Session) -> Arc<dyn StsApi>;

    /// Route 53 client on the global session
    fn dns(&self, session: &Self::Session) -> Arc<dyn DnsApi>;

    fn direct_connect(&self, session: &Self::Session) -> Arc<dyn DirectConnectApi>;
}

/// Sessions of one provider block
#[derive(Debug, Clone)]
pub struct SdkSession {
    /// Bound to the configured region
    pub base: SdkConfig,
    /// Base session pinned to `us-east-1`
    pub global: SdkConfig,
    pub endpoints: EndpointsConfig,
}

/// Session builder backed by `aws-config` and the AWS SDK clients
#[derive(Debug, Clone, Default)]
pub struct SdkSessionBuilder;

impl SdkSessionBuilder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionBuilder for SdkSessionBuilder {
    type Session = SdkSession;

    async fn session(&self, config: &ProviderConfig) -> ProviderResult<SdkSession> {
        info!("Building AWS auth structure");
        let credentials = credentials_provider(config).await;
        check_credentials(&credentials).await?;

        if config.skip_metadata_api_check {
            debug!("skip_metadata_api_check is set, the default credential chain is used as is");
        }
        if config.s3_force_path_style {
            debug!("s3_force_path_style has no effect on the services used by this provider");
        }
        validate_endpoints(&config.endpoints)?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials.provider)
            .retry_config(RetryConfig::standard().with_max_attempts(config.max_retries.saturating_add(1)));

        if config.insecure {
            warn!("insecure is set, TLS certificates will not be verified for this provider");
            loader = loader.http_client(insecure::http_client());
        }

        let base = loader.load().await;
        let global = base
            .to_builder()
            .region(Region::from_static(GLOBAL_REGION))
            .build();

        Ok(SdkSession {
            base,
            global,
            endpoints: config.endpoints.clone(),
        })
    }

    fn iam(&self, session: &SdkSession) -> Arc<dyn IamApi> {
        let mut builder = aws_sdk_iam::config::Builder::from(&session.base);
        if let Some(url) = &session.endpoints.iam {
            builder = builder.endpoint_url(url);
        }
        Arc::new(SdkIam::new(aws_sdk_iam::Client::from_conf(builder.build())))
    }

    fn sts(&self, session: &SdkSession) -> Arc<dyn StsApi> {
        let mut builder = aws_sdk_sts::config::Builder::from(&session.base);
        if let Some(url) = &session.endpoints.sts {
            builder = builder.endpoint_url(url);
        }
        Arc::new(SdkSts::new(aws_sdk_sts::Client::from_conf(builder.build())))
    }

    fn dns(&self, session: &SdkSession) -> Arc<dyn DnsApi> {
        let mut builder = aws_sdk_route53::config::Builder::from(&session.global);
        if let Some(url) = &session.endpoints.route53 {
            builder = builder.endpoint_url(url);
        }
        Arc::new(SdkDns::new(aws_sdk_route53::Client::from_conf(
            builder.build(),
        )))
    }

    fn direct_connect(&self, session: &SdkSession) -> Arc<dyn DirectConnectApi> {
        let mut builder = aws_sdk_directconnect::config::Builder::from(&session.base);
        if let Some(url) = &session.endpoints.directconnect {
            builder = builder.endpoint_url(url);
        }
        Arc::new(SdkDirectConnect::new(aws_sdk_directconnect::Client::from_conf(
            builder.build(),
        )))
    }
}

/// Credential provider picked from the configuration, with its label
struct NamedCredentials {
    name: &'static str,
    provider: SharedCredentialsProvider,
}

/// Static keys, then the shared credentials file, then the default chain;
/// optionally wrapped by assume-role
async fn credentials_provider(config: &ProviderConfig) -> NamedCredentials {
    let region = Region::new(config.region.clone());

    let base = if !config.access_key.is_empty() && !config.secret_key.is_empty() {
        let token = Some(config.token.clone()).filter(|t| !t.is_empty());
        NamedCredentials {
            name: "StaticProvider",
            provider: SharedCredentialsProvider::new(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                token,
                None,
                "StaticProvider",
            )),
        }
    } else if !config.profile.is_empty() || !config.shared_credentials_file.is_empty() {
        let mut builder = ProfileFileCredentialsProvider::builder();
        if !config.profile.is_empty() {
            builder = builder.profile_name(&config.profile);
        }
        if !config.shared_credentials_file.is_empty() {
            let files = ProfileFiles::builder()
                .include_default_config_file(true)
                .with_file(ProfileFileKind::Credentials, &config.shared_credentials_file)
                .build();
            builder = builder.profile_files(files);
        }
        NamedCredentials {
            name: "SharedCredentialsProvider",
            provider: SharedCredentialsProvider::new(builder.build()),
        }
    } else {
        NamedCredentials {
            name: "DefaultCredentialsChain",
            provider: SharedCredentialsProvider::new(
                DefaultCredentialsChain::builder()
                    .region(region.clone())
                    .build()
                    .await,
            ),
        }
    };

    let Some(role) = config.role_to_assume() else {
        return base;
    };

    info!("Assuming role {:?} on top of {}", role.role_arn, base.name);
    let mut builder = AssumeRoleProvider::builder(role.role_arn.clone()).region(region);
    if !role.session_name.is_empty() {
        builder = builder.session_name(role.session_name.clone());
    }
    if !role.external_id.is_empty() {
        builder = builder.external_id(role.external_id.clone());
    }
    if !role.policy.is_empty() {
        builder = builder.policy(role.policy.clone());
    }
    NamedCredentials {
        name: "AssumeRoleProvider",
        provider: SharedCredentialsProvider::new(builder.build_from_provider(base.provider).await),
    }
}

/// Resolve credentials once so a missing chain is reported up front
async fn check_credentials(credentials: &NamedCredentials) -> ProviderResult<()> {
    match credentials.provider.provide_credentials().await {
        Ok(_) => {
            info!("AWS Auth provider used: {:?}", credentials.name);
            Ok(())
        }
        Err(CredentialsError::CredentialsNotLoaded(_)) => {
            Err(ProviderError::credentials(NO_CREDENTIALS_MESSAGE))
        }
        Err(e) => Err(ProviderError::credentials(format!(
            "Error loading credentials for AWS Provider: {}",
            DisplayErrorContext(&e)
        ))
        .with_cause(e)),
    }
}

fn validate_endpoints(endpoints: &EndpointsConfig) -> ProviderResult<()> {
    let overrides = [
        ("dynamodb", &endpoints.dynamodb),
        ("iam", &endpoints.iam),
        ("ec2", &endpoints.ec2),
        ("elb", &endpoints.elb),
        ("kinesis", &endpoints.kinesis),
        ("s3", &endpoints.s3),
        ("sts", &endpoints.sts),
        ("route53", &endpoints.route53),
        ("directconnect", &endpoints.directconnect),
    ];
    for (service, url) in overrides {
        if let Some(url) = url
            && !(url.starts_with("https://") || url.starts_with("http://"))
        {
            return Err(ProviderError::config(format!(
                "Error creating AWS session: invalid {} endpoint {:?}, expected an http(s) URL",
                service, url
            )));
        }
    }
    Ok(())
}

/// Transport that skips certificate verification, built per session
mod insecure {
    use std::sync::Arc;
    use std::time::SystemTime;

    use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;
    use aws_smithy_runtime_api::client::http::SharedHttpClient;
    use rustls::client::{ServerCertVerified, ServerCertVerifier};
    use rustls::{Certificate, ClientConfig, ServerName};

    struct NoCertificateVerification;

    impl ServerCertVerifier for NoCertificateVerification {
        fn verify_server_cert(
            &self,
            _end_entity: &Certificate,
            _intermediates: &[Certificate],
            _server_name: &ServerName,
            _scts: &mut dyn Iterator<Item = &[u8]>,
            _ocsp_response: &[u8],
            _now: SystemTime,
        ) -> Result<ServerCertVerified, rustls::Error> {
            Ok(ServerCertVerified::assertion())
        }
    }

    pub(super) fn http_client() -> SharedHttpClient {
        let tls = ClientConfig::builder()
            .with_safe_defaults()
            .with_custom_certificate_verifier(Arc::new(NoCertificateVerification))
            .with_no_client_auth();
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls)
            .https_or_http()
            .enable_http1()
            .build();
        HyperClientBuilder::new().build(connector)
    }
}
