//! Polling waiter for eventually consistent operations

use std::future::Future;
use std::time::Duration;

use extras_core::provider::{ProviderError, ProviderResult};
use log::{debug, warn};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::DnsApi;

/// Upper bound of the gap between two polls
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Route 53 change states
pub const CHANGE_PENDING: &str = "PENDING";
pub const CHANGE_INSYNC: &str = "INSYNC";

/// How to wait for a remote object to reach one of the target states
#[derive(Debug, Clone)]
pub struct StateChangeConf {
    /// Wait before the first poll
    pub delay: Duration,
    pub pending: &'static [&'static str],
    pub target: &'static [&'static str],
    /// Overall deadline, counted from the start including `delay`
    pub timeout: Duration,
    /// Smallest gap between polls
    pub min_timeout: Duration,
}

impl StateChangeConf {
    /// Poll `refresh` until it reports a target state.
    ///
    /// States outside both sets are logged and treated as pending. Refresh
    /// errors abort the wait. A refresh still running at the deadline is
    /// dropped and reported as a timeout. The last observed state is
    /// returned.
    pub async fn wait_for_state<F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut refresh: F,
    ) -> ProviderResult<String>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<String>>,
    {
        let deadline = Instant::now() + self.timeout;
        debug!(
            "Waiting for state to become {:?} (delay: {:?}, timeout: {:?})",
            self.target, self.delay, self.timeout
        );
        sleep_or_cancel(cancel, self.delay).await?;

        let mut interval = self.min_timeout;
        let mut last_state = String::new();

        loop {
            if Instant::now() >= deadline {
                return Err(self.timeout_error(&last_state));
            }

            let state = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled()),
                result = tokio::time::timeout_at(deadline, refresh()) => match result {
                    Ok(result) => result?,
                    Err(_) => return Err(self.timeout_error(&last_state)),
                },
            };

            if self.target.contains(&state.as_str()) {
                debug!("Reached target state {:?}", state);
                return Ok(state);
            }
            if self.pending.contains(&state.as_str()) {
                debug!("Still pending, state {:?}", state);
            } else {
                warn!(
                    "Unexpected state {:?} while waiting for {:?}, treating it as pending",
                    state, self.target
                );
            }
            last_state = state;

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.timeout_error(&last_state));
            }
            sleep_or_cancel(cancel, interval.min(remaining)).await?;
            interval = (interval * 2).min(MAX_POLL_INTERVAL).max(self.min_timeout);
        }
    }

    fn timeout_error(&self, last_state: &str) -> ProviderError {
        ProviderError::timeout(format!(
            "timeout while waiting for state to become '{}' (last state: '{}', timeout: {})",
            self.target.join(", "),
            last_state,
            format_duration(self.timeout)
        ))
    }
}

fn cancelled() -> ProviderError {
    ProviderError::cancelled("operation cancelled while waiting for state change")
}

async fn sleep_or_cancel(cancel: &CancellationToken, duration: Duration) -> ProviderResult<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(cancelled()),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Render a duration the way Go prints it, e.g. `10m0s` or `1h0m0s`
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    if total == 0 {
        return format!("{}ms", d.as_millis());
    }
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Route 53 change propagation: PENDING until INSYNC
pub const CHANGE_PROPAGATION: StateChangeConf = StateChangeConf {
    delay: Duration::from_secs(30),
    pending: &[CHANGE_PENDING],
    target: &[CHANGE_INSYNC],
    timeout: Duration::from_secs(10 * 60),
    min_timeout: Duration::from_secs(2),
};

/// Wait until a Route 53 change has propagated to all name servers
pub async fn wait_for_change(
    dns: &dyn DnsApi,
    change_id: &str,
    cancel: &CancellationToken,
) -> ProviderResult<()> {
    CHANGE_PROPAGATION
        .wait_for_state(cancel, move || async move {
            let change = dns.get_change(change_id).await?;
            Ok::<_, ProviderError>(change.status)
        })
        .await
        .map(|_| ())
}
