pub mod token_store;

pub use token_store::TokenStore;

use crate::utils::error::{AppError, AppResult};
use crate::utils::output::{print_info, print_success};
use async_trait::async_trait;
use std::time::Duration;

/// The persisted authorization state: the access token is mandatory once a
/// flow has succeeded, the refresh token may be absent on records written by
/// older flows. A refresh produces a whole new record; records are never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Device-code grant issued by the authorization service. The user enters
/// `user_code` at `verification_url` while the client polls with
/// `device_code`.
#[derive(Debug, Clone)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    pub expires_in_secs: u64,
    pub interval_secs: u64,
}

/// Outcome of a single poll against the device-token endpoint.
#[derive(Debug, Clone)]
pub enum DevicePoll {
    Approved(CredentialRecord),
    Pending,
    SlowDown,
    Expired,
    Denied,
}

/// Remote authorization calls, one network round trip each. The Trakt client
/// is the production implementation; tests substitute a scripted fake.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn generate_device_code(&self) -> AppResult<DeviceCode>;
    async fn poll_device_token(&self, device: &DeviceCode) -> AppResult<DevicePoll>;
    /// Returns true when the access token has been revoked or is invalid.
    async fn check_token_revoked(&self, access_token: &str) -> AppResult<bool>;
    async fn refresh_token(&self, refresh_token: &str) -> AppResult<CredentialRecord>;
    async fn revoke_token(&self, access_token: &str) -> AppResult<()>;
}

/// Injectable sleep so the device-code polling loop is testable without
/// wall-clock delay.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Steps of the acquisition state machine. The credential record travels
/// with the step so every transition hands a complete record forward.
enum AuthStep {
    Start,
    Authorizing,
    Validating(CredentialRecord),
    Refreshing(CredentialRecord),
    Authorized(CredentialRecord),
}

/// Owns the credential lifecycle. `acquire` walks
/// `Start → Authorizing → Validating → Refreshing → Authorized`, skipping
/// `Authorizing` when a stored record exists and `Refreshing` when the
/// service reports the token still valid. Every API call made afterwards in
/// the session can rely on a live token.
///
/// Validation happens on every construction rather than lazily on first
/// use; one extra round trip is acceptable for a batch tool.
#[derive(Debug)]
pub struct CredentialManager<S: AuthService> {
    service: S,
    store: TokenStore,
    record: CredentialRecord,
}

impl<S: AuthService> CredentialManager<S> {
    pub async fn acquire(service: S, store: TokenStore, clock: &dyn Clock) -> AppResult<Self> {
        let mut step = AuthStep::Start;

        let record = loop {
            step = match step {
                AuthStep::Start => {
                    if store.exists() {
                        AuthStep::Validating(store.load()?)
                    } else {
                        AuthStep::Authorizing
                    }
                }
                AuthStep::Authorizing => {
                    AuthStep::Validating(Self::run_device_flow(&service, &store, clock).await?)
                }
                AuthStep::Validating(record) => {
                    if service.check_token_revoked(&record.access_token).await? {
                        AuthStep::Refreshing(record)
                    } else {
                        AuthStep::Authorized(record)
                    }
                }
                AuthStep::Refreshing(record) => {
                    let refresh_token = record.refresh_token.as_deref().ok_or_else(|| {
                        AppError::RefreshImpossible(
                            "access token is no longer valid and the stored record has no refresh token"
                                .to_string(),
                        )
                    })?;

                    let refreshed = service.refresh_token(refresh_token).await?;
                    store.save(&refreshed)?;
                    AuthStep::Authorized(refreshed)
                }
                AuthStep::Authorized(record) => break record,
            };
        };

        Ok(Self {
            service,
            store,
            record,
        })
    }

    /// Blocking-wait loop of the device-code flow: surface the verification
    /// URL and user code, then poll at the service's prescribed interval
    /// until approval or the approval window closes.
    async fn run_device_flow(
        service: &S,
        store: &TokenStore,
        clock: &dyn Clock,
    ) -> AppResult<CredentialRecord> {
        let device = service.generate_device_code().await?;

        print_info(&format!(
            "Please go to {} and enter code {} on the page.",
            device.verification_url, device.user_code
        ));

        let window = Duration::from_secs(device.expires_in_secs);
        let mut interval = Duration::from_secs(device.interval_secs);
        let mut waited = Duration::ZERO;

        loop {
            if waited >= window {
                return Err(AppError::DeviceFlowTimedOut(format!(
                    "no approval received within {} seconds",
                    device.expires_in_secs
                )));
            }

            clock.sleep(interval).await;
            waited += interval;

            match service.poll_device_token(&device).await? {
                DevicePoll::Approved(record) => {
                    store.save(&record)?;
                    print_success("Authorization approved, access token saved.");
                    return Ok(record);
                }
                DevicePoll::Pending => {}
                DevicePoll::SlowDown => {
                    interval += Duration::from_secs(1);
                }
                DevicePoll::Expired => {
                    return Err(AppError::DeviceFlowTimedOut(
                        "the verification code expired before approval".to_string(),
                    ));
                }
                DevicePoll::Denied => {
                    return Err(AppError::RemoteService(
                        "the device authorization request was denied".to_string(),
                    ));
                }
            }
        }
    }

    pub fn access_token(&self) -> &str {
        &self.record.access_token
    }

    pub fn credentials(&self) -> &CredentialRecord {
        &self.record
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Invalidates the current token with the authorization service. The
    /// stored record is left in place: the next `acquire` detects the
    /// revoked token and refreshes, or the operator deletes the file to
    /// force a fresh device-code flow.
    pub async fn revoke(&self) -> AppResult<()> {
        self.service.revoke_token(&self.record.access_token).await
    }
}
