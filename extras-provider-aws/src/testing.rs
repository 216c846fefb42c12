//! In-memory API fakes for unit tests

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use extras_core::provider::{ProviderError, ProviderResult};
use parking_lot::Mutex;

use crate::api::{
    ApiError, ApiResult, CallerIdentity, ChangeInfo, DirectConnectApi, DnsApi, Gateway, IamApi,
    NO_SUCH_HOSTED_ZONE, NewPrivateVirtualInterface, StsApi, VirtualInterface, VpcRef,
};
use crate::client::{AwsClient, BaseClient};
use crate::config::ProviderConfig;
use crate::session::SessionBuilder;

pub const TEST_ACCOUNT: &str = "123456789012";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn no_such_zone(zone_id: &str) -> ApiError {
    ApiError::service(
        NO_SUCH_HOSTED_ZONE,
        format!("No hosted zone found with ID: {}", zone_id),
    )
}

#[derive(Default)]
struct DnsState {
    calls: Vec<String>,
    next_change: u32,
    change_scripts: HashMap<String, VecDeque<String>>,
    default_change_status: Option<String>,
    get_change_error: Option<String>,
    list_error: Option<String>,
    missing_zones: HashSet<String>,
    authorizations: HashMap<String, Vec<VpcRef>>,
}

/// Route 53 fake recording every call
#[derive(Default)]
pub struct FakeDns {
    state: Mutex<DnsState>,
}

impl FakeDns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses returned by successive GetChange calls for `change_id`
    pub fn script_change(&self, change_id: &str, statuses: &[&str]) {
        self.state.lock().change_scripts.insert(
            change_id.to_string(),
            statuses.iter().map(|s| s.to_string()).collect(),
        );
    }

    /// Status once a script is exhausted (INSYNC unless set)
    pub fn set_default_change_status(&self, status: &str) {
        self.state.lock().default_change_status = Some(status.to_string());
    }

    pub fn fail_get_change(&self, code: &str) {
        self.state.lock().get_change_error = Some(code.to_string());
    }

    pub fn fail_list(&self, code: &str) {
        self.state.lock().list_error = Some(code.to_string());
    }

    pub fn remove_zone(&self, zone_id: &str) {
        self.state.lock().missing_zones.insert(zone_id.to_string());
    }

    pub fn authorize(&self, zone_id: &str, vpc: VpcRef) {
        self.state
            .lock()
            .authorizations
            .entry(zone_id.to_string())
            .or_default()
            .push(vpc);
    }

    pub fn authorizations(&self, zone_id: &str) -> Vec<VpcRef> {
        self.state
            .lock()
            .authorizations
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    fn count_calls(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn get_change_calls(&self) -> usize {
        self.count_calls("get_change ")
    }

    pub fn associate_calls(&self) -> usize {
        self.count_calls("associate ")
    }

    fn record(&self, call: String) {
        self.state.lock().calls.push(call);
    }

    fn check_zone(&self, zone_id: &str) -> ApiResult<()> {
        if self.state.lock().missing_zones.contains(zone_id) {
            Err(no_such_zone(zone_id))
        } else {
            Ok(())
        }
    }

    fn new_change(&self) -> ChangeInfo {
        let mut state = self.state.lock();
        state.next_change += 1;
        ChangeInfo {
            id: format!("/change/C{}", state.next_change),
            status: "PENDING".to_string(),
        }
    }
}

#[async_trait]
impl DnsApi for FakeDns {
    async fn associate_vpc_with_hosted_zone(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
        comment: Option<&str>,
    ) -> ApiResult<ChangeInfo> {
        self.record(format!(
            "associate {} {} {} {}",
            zone_id,
            vpc.vpc_id,
            vpc.vpc_region,
            comment.unwrap_or("-")
        ));
        self.check_zone(zone_id)?;
        Ok(self.new_change())
    }

    async fn disassociate_vpc_from_hosted_zone(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
    ) -> ApiResult<ChangeInfo> {
        self.record(format!(
            "disassociate {} {} {}",
            zone_id, vpc.vpc_id, vpc.vpc_region
        ));
        self.check_zone(zone_id)?;
        Ok(self.new_change())
    }

    async fn create_vpc_association_authorization(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
    ) -> ApiResult<()> {
        self.record(format!(
            "authorize {} {} {}",
            zone_id, vpc.vpc_id, vpc.vpc_region
        ));
        self.check_zone(zone_id)?;
        self.authorize(zone_id, vpc.clone());
        Ok(())
    }

    async fn delete_vpc_association_authorization(
        &self,
        zone_id: &str,
        vpc: &VpcRef,
    ) -> ApiResult<()> {
        self.record(format!(
            "revoke {} {} {}",
            zone_id, vpc.vpc_id, vpc.vpc_region
        ));
        self.check_zone(zone_id)?;
        if let Some(vpcs) = self.state.lock().authorizations.get_mut(zone_id) {
            vpcs.retain(|v| v.vpc_id != vpc.vpc_id);
        }
        Ok(())
    }

    async fn list_vpc_association_authorizations(&self, zone_id: &str) -> ApiResult<Vec<VpcRef>> {
        self.record(format!("list {}", zone_id));
        self.check_zone(zone_id)?;
        if let Some(code) = self.state.lock().list_error.clone() {
            return Err(ApiError::service(code, "list failed"));
        }
        Ok(self.authorizations(zone_id))
    }

    async fn get_change(&self, change_id: &str) -> ApiResult<ChangeInfo> {
        self.record(format!("get_change {}", change_id));
        let mut state = self.state.lock();
        if let Some(code) = &state.get_change_error {
            return Err(ApiError::service(code.clone(), "get change failed"));
        }
        let scripted = state
            .change_scripts
            .get_mut(change_id)
            .and_then(|script| script.pop_front());
        let status = scripted
            .or_else(|| state.default_change_status.clone())
            .unwrap_or_else(|| "INSYNC".to_string());
        Ok(ChangeInfo {
            id: format!("/change/{}", change_id),
            status,
        })
    }
}

/// STS fake answering GetCallerIdentity
pub struct FakeSts {
    identity: ApiResult<CallerIdentity>,
    calls: AtomicUsize,
}

impl FakeSts {
    pub fn new(account: &str) -> Self {
        Self {
            identity: Ok(CallerIdentity {
                account: account.to_string(),
                arn: format!("arn:aws:iam::{}:user/extras", account),
                user_id: "AIDAEXAMPLE".to_string(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(code: &str) -> Self {
        Self {
            identity: Err(ApiError::service(code, "The security token included in the request is invalid")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StsApi for FakeSts {
    async fn get_caller_identity(&self) -> ApiResult<CallerIdentity> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.identity.clone()
    }
}

/// IAM fake answering GetUser
pub struct FakeIam {
    arn: ApiResult<String>,
}

impl FakeIam {
    pub fn new(account: &str) -> Self {
        Self {
            arn: Ok(format!("arn:aws:iam::{}:user/extras", account)),
        }
    }

    pub fn failing(code: &str) -> Self {
        Self {
            arn: Err(ApiError::service(code, "User is not authorized")),
        }
    }
}

#[async_trait]
impl IamApi for FakeIam {
    async fn get_current_user_arn(&self) -> ApiResult<String> {
        self.arn.clone()
    }
}

#[derive(Default)]
struct DxState {
    calls: Vec<String>,
    next_id: u32,
    interfaces: HashMap<String, VirtualInterface>,
    state_scripts: HashMap<String, VecDeque<String>>,
}

/// Direct Connect fake. Allocated interfaces settle in `confirming`,
/// confirmed ones in `available` and deleted ones in `deleted` unless a
/// script of states is given.
#[derive(Default)]
pub struct FakeDx {
    state: Mutex<DxState>,
}

impl FakeDx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, vif: VirtualInterface) {
        self.state.lock().interfaces.insert(vif.id.clone(), vif);
    }

    pub fn interface(&self, id: &str) -> Option<VirtualInterface> {
        self.state.lock().interfaces.get(id).cloned()
    }

    /// States reported by successive describe calls for `id`
    pub fn script_states(&self, id: &str, states: &[&str]) {
        self.state.lock().state_scripts.insert(
            id.to_string(),
            states.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl DirectConnectApi for FakeDx {
    async fn allocate_private_virtual_interface(
        &self,
        request: &NewPrivateVirtualInterface,
    ) -> ApiResult<VirtualInterface> {
        let mut state = self.state.lock();
        state.calls.push(format!(
            "allocate {} {} {}",
            request.connection_id, request.owner_account_id, request.vlan
        ));
        state.next_id += 1;
        let vif = VirtualInterface {
            id: format!("dxvif-fake{}", state.next_id),
            state: "pending".to_string(),
            name: Some(request.name.clone()),
            owner_account: Some(request.owner_account_id.clone()),
            connection_id: Some(request.connection_id.clone()),
            address_family: Some(request.address_family.clone()),
            amazon_address: request
                .amazon_address
                .clone()
                .or_else(|| Some("169.254.255.1/30".to_string())),
            customer_address: request
                .customer_address
                .clone()
                .or_else(|| Some("169.254.255.2/30".to_string())),
            bgp_auth_key: request
                .bgp_auth_key
                .clone()
                .or_else(|| Some("generated".to_string())),
            ..Default::default()
        };
        let settled = VirtualInterface {
            state: "confirming".to_string(),
            ..vif.clone()
        };
        state.interfaces.insert(vif.id.clone(), settled);
        Ok(vif)
    }

    async fn describe_virtual_interface(&self, id: &str) -> ApiResult<Option<VirtualInterface>> {
        let mut state = self.state.lock();
        state.calls.push(format!("describe {}", id));
        let scripted = state
            .state_scripts
            .get_mut(id)
            .and_then(|script| script.pop_front());
        let Some(vif) = state.interfaces.get_mut(id) else {
            return Ok(None);
        };
        if let Some(next) = scripted {
            vif.state = next;
        }
        Ok(Some(vif.clone()))
    }

    async fn confirm_private_virtual_interface(
        &self,
        id: &str,
        gateway: &Gateway,
    ) -> ApiResult<String> {
        let mut state = self.state.lock();
        state.calls.push(format!("confirm {} {:?}", id, gateway));
        let Some(vif) = state.interfaces.get_mut(id) else {
            return Err(ApiError::service(
                "DirectConnectClientException",
                format!("Virtual interface {} does not exist", id),
            ));
        };
        match gateway {
            Gateway::Vpn(gw) => vif.virtual_gateway_id = Some(gw.clone()),
            Gateway::DirectConnect(gw) => vif.dx_gateway_id = Some(gw.clone()),
        }
        vif.state = "available".to_string();
        Ok("pending".to_string())
    }

    async fn delete_virtual_interface(&self, id: &str) -> ApiResult<String> {
        let mut state = self.state.lock();
        state.calls.push(format!("delete {}", id));
        let Some(vif) = state.interfaces.get_mut(id) else {
            return Err(ApiError::service(
                "DirectConnectClientException",
                format!("Virtual interface {} does not exist", id),
            ));
        };
        vif.state = "deleted".to_string();
        Ok("deleting".to_string())
    }
}

/// One account's worth of fakes
#[derive(Clone)]
pub struct FakeAccount {
    pub account_id: String,
    pub dns: Arc<FakeDns>,
    pub sts: Arc<FakeSts>,
    pub iam: Arc<FakeIam>,
    pub dx: Arc<FakeDx>,
}

impl FakeAccount {
    pub fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            dns: Arc::new(FakeDns::new()),
            sts: Arc::new(FakeSts::new(account_id)),
            iam: Arc::new(FakeIam::new(account_id)),
            dx: Arc::new(FakeDx::new()),
        }
    }

    pub fn base(&self, region: &str) -> BaseClient {
        BaseClient {
            region: region.to_string(),
            partition: "aws".to_string(),
            account_id: self.account_id.clone(),
            dns: self.dns.clone(),
            iam: self.iam.clone(),
            sts: self.sts.clone(),
            direct_connect: self.dx.clone(),
        }
    }

    pub fn client(&self, region: &str, label: &str) -> AwsClient {
        AwsClient::new(self.base(region), label)
    }
}

/// Base context over a fresh set of fakes
pub fn base_client(region: &str) -> BaseClient {
    FakeAccount::new(TEST_ACCOUNT).base(region)
}

/// Session builder handing out the clients of a fake account
pub struct StubSessionBuilder {
    pub account: FakeAccount,
    session_error: Option<String>,
    sessions: AtomicUsize,
}

impl StubSessionBuilder {
    pub fn new(account: FakeAccount) -> Self {
        Self {
            account,
            session_error: None,
            sessions: AtomicUsize::new(0),
        }
    }

    /// Fail session creation the way a broken credential chain does
    pub fn without_credentials(account: FakeAccount) -> Self {
        Self {
            session_error: Some(crate::session::NO_CREDENTIALS_MESSAGE.to_string()),
            ..Self::new(account)
        }
    }

    pub fn sessions(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionBuilder for StubSessionBuilder {
    type Session = String;

    async fn session(&self, config: &ProviderConfig) -> ProviderResult<String> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        match &self.session_error {
            Some(message) => Err(ProviderError::credentials(message.clone())),
            None => Ok(config.region.clone()),
        }
    }

    fn iam(&self, _session: &String) -> Arc<dyn IamApi> {
        self.account.iam.clone()
    }

    fn sts(&self, _session: &String) -> Arc<dyn StsApi> {
        self.account.sts.clone()
    }

    fn dns(&self, _session: &String) -> Arc<dyn DnsApi> {
        self.account.dns.clone()
    }

    fn direct_connect(&self, _session: &String) -> Arc<dyn DirectConnectApi> {
        self.account.dx.clone()
    }
}
